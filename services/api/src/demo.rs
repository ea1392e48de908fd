use crate::infra::{demo_tenants, load_cv_file, parse_sort, parse_tier};
use affittochiaro::cv::{
    format, write_csv, CvCompleteness, CvEmploymentInfo, CvGuardPolicy, CvPersonalInfo,
    CvRentalEntry, CvRepository, CvService, CvView, DirectoryEntry, DirectoryQuery, DirectorySort,
    DocumentType, DocumentUpload, EmploymentType, InMemoryCvRepository, JsonFileCvRepository,
    PresentationVideo, ProfileUpdate, PropertyType, RecordId, ReliabilityScore, ReliabilityTier,
    TenantId, TenantPreferences, TenantProfile, TenantReference,
};
use affittochiaro::error::AppError;
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CV document to score (JSON)
    pub(crate) file: PathBuf,
    /// Print the breakdown as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DirectoryArgs {
    /// Read CVs from a JSON file store instead of the built-in demo tenants
    #[arg(long)]
    pub(crate) store_dir: Option<PathBuf>,
    /// Only list tenants with at least this completeness total
    #[arg(long)]
    pub(crate) min_total: Option<u8>,
    /// Only list tenants at this reliability tier or above
    #[arg(long, value_parser = parse_tier)]
    pub(crate) min_tier: Option<ReliabilityTier>,
    /// Only list tenants searching in this city
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// completeness_desc, completeness_asc or name
    #[arg(long, value_parser = parse_sort, default_value = "completeness_desc")]
    pub(crate) sort: DirectorySort,
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Export the listing as CSV to this path (`-` for stdout)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Tenant id used for the walkthrough
    #[arg(long, default_value = "tenant-demo")]
    pub(crate) tenant: String,
    /// Skip the agency directory printed at the end
    #[arg(long)]
    pub(crate) skip_directory: bool,
}

#[derive(Debug, Serialize)]
struct ScoreOutput<'a> {
    tenant_id: &'a TenantId,
    display_name: String,
    completeness: &'a CvCompleteness,
    reliability: ReliabilityScore,
}

pub(crate) fn run_cv_score(args: ScoreArgs) -> Result<(), AppError> {
    let cv = load_cv_file(&args.file)?;
    let completeness = cv.completeness();

    if args.json {
        let output = ScoreOutput {
            tenant_id: cv.tenant_id(),
            display_name: cv.profile.display_name(),
            completeness: &completeness,
            reliability: completeness.reliability(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} ({})", cv.profile.display_name(), cv.tenant_id());
    if let Some(income) = cv.profile.employment.visible_income() {
        println!("Reddito annuo: {}", format::euros(income));
    }
    print!("{}", format::render_summary(&completeness));
    Ok(())
}

pub(crate) fn run_cv_directory(args: DirectoryArgs) -> Result<(), AppError> {
    let query = DirectoryQuery {
        min_total: args.min_total,
        min_tier: args.min_tier,
        city: args.city,
        sort: args.sort,
        limit: args.limit,
    };

    let entries = match args.store_dir {
        Some(dir) => list_directory(Arc::new(JsonFileCvRepository::open(dir)?), &query)?,
        None => list_directory(
            Arc::new(InMemoryCvRepository::seeded(demo_tenants())),
            &query,
        )?,
    };

    match args.csv {
        Some(path) if path.as_os_str() == "-" => write_csv(&entries, io::stdout().lock())?,
        Some(path) => {
            write_csv(&entries, File::create(&path)?)?;
            println!("Esportati {} profili in {}", entries.len(), path.display());
        }
        None => print_directory(&entries),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryCvRepository::seeded(demo_tenants()));
    let service = CvService::new(repository, CvGuardPolicy::default());
    let tenant_id = TenantId(args.tenant);

    println!("Affittochiaro CV demo");
    let view = service.register(TenantProfile::empty(tenant_id.clone()))?;
    print_step("Registrazione", &view);

    let view = service.update_profile(&tenant_id, demo_profile_update())?;
    print_step("Dati personali e lavoro", &view);

    let view = service.set_video(
        &tenant_id,
        Some(PresentationVideo {
            url: "https://cdn.affittochiaro.it/videos/demo.mp4".to_string(),
            duration_seconds: Some(52),
            uploaded_at: Some(Utc::now()),
        }),
    )?;
    print_step("Video di presentazione", &view);

    let view = service.set_preferences(
        &tenant_id,
        Some(TenantPreferences {
            min_budget: Some(650),
            max_budget: Some(900),
            cities: vec!["Torino".to_string()],
            property_types: vec![PropertyType::Apartment],
            move_in_date: demo_date(2024, 10, 1),
        }),
    )?;
    print_step("Preferenze di ricerca", &view);

    for (doc_type, name, file_name) in [
        (DocumentType::IdentityCard, "Carta d'identità", "carta-identita.pdf"),
        (DocumentType::PaySlip, "Busta paga settembre", "busta-paga.pdf"),
    ] {
        let view = service.add_document(
            &tenant_id,
            DocumentUpload {
                doc_type,
                name: name.to_string(),
                file_name: file_name.to_string(),
                size_bytes: 420_000,
                mime_type: None,
            },
        )?;
        print_step(&format!("Documento: {name}"), &view);
    }

    if let Some(start_date) = demo_date(2020, 2, 1) {
        let view = service.add_rental_entry(
            &tenant_id,
            CvRentalEntry {
                id: RecordId::default(),
                address: "Via Nizza 88".to_string(),
                city: "Torino".to_string(),
                province: Some("TO".to_string()),
                start_date,
                end_date: demo_date(2024, 6, 30),
                is_current: false,
                monthly_rent: 620,
                has_reference: true,
                reason_for_leaving: Some("Casa più grande".to_string()),
            },
        )?;
        print_step("Storico affitti", &view);
    }

    let view = service.add_reference(
        &tenant_id,
        TenantReference {
            id: RecordId::default(),
            landlord_name: "Carla Moretti".to_string(),
            property_address: Some("Via Nizza 88, Torino".to_string()),
            rating: 5,
            rental_period: None,
            comment: Some("Inquilina ordinata e puntuale.".to_string()),
            is_verified: false,
        },
    )?;
    print_step("Referenza", &view);

    println!();
    print!("{}", format::render_summary(&view.completeness));

    if !args.skip_directory {
        println!("\nDirectory agenzie");
        print_directory(&service.directory(&DirectoryQuery::default())?);
    }

    Ok(())
}

fn list_directory<R>(
    repository: Arc<R>,
    query: &DirectoryQuery,
) -> Result<Vec<DirectoryEntry>, AppError>
where
    R: CvRepository + 'static,
{
    let service = CvService::new(repository, CvGuardPolicy::default());
    Ok(service.directory(query)?)
}

fn demo_profile_update() -> ProfileUpdate {
    ProfileUpdate {
        personal: CvPersonalInfo {
            first_name: Some("Chiara".to_string()),
            last_name: Some("Marino".to_string()),
            phone: Some("+39 340 111 2233".to_string()),
            date_of_birth: demo_date(1996, 7, 14),
            bio: Some("Sviluppatrice, cerco casa in zona San Salvario.".to_string()),
            avatar_url: Some("https://cdn.affittochiaro.it/avatars/demo.jpg".to_string()),
        },
        employment: CvEmploymentInfo {
            occupation: Some("Sviluppatrice software".to_string()),
            employment_type: Some(EmploymentType::Permanent),
            employer: Some("Officine Digitali".to_string()),
            sector: Some("Informatica".to_string()),
            annual_income: Some(38_000),
            income_visible: true,
            employment_start_date: demo_date(2021, 1, 11),
        },
    }
}

fn demo_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn print_step(step: &str, view: &CvView) {
    println!(
        "  {:<28} {} {}",
        step,
        format::progress_bar(view.completeness.total, 20),
        view.reliability.label
    );
}

fn print_directory(entries: &[DirectoryEntry]) {
    if entries.is_empty() {
        println!("  nessun profilo corrisponde ai filtri");
        return;
    }

    for entry in entries {
        println!(
            "  {:<16} {:<12} {:>4}  {:<13} documenti verificati: {}",
            entry.display_name,
            entry.city.as_deref().unwrap_or("-"),
            format::percent(entry.total),
            entry.tier_label,
            entry.verified_documents
        );
    }
}
