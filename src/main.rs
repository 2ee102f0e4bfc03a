use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use attendance_monitor::config::ServiceConfig;
use attendance_monitor::monitor::{build_report, MonitorQuery};
use attendance_monitor::schedule::parse_day;
use attendance_monitor::{db, seed, serve};

#[derive(Parser, Debug)]
#[command(author, version, about = "Record class attendance and monitor it per student")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database tables
    InitDb {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fill the database with demo departments, students, lectures and attendance
    Seed {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// First day of demo attendance, YYYY-MM-DD (default: ten days ago)
        #[arg(long)]
        first_day: Option<String>,
    },
    /// Serve the HTTP API
    Serve {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the attendance summary and the students with the lowest attendance
    Summary {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        /// Inclusive lower bound, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        date_from: Option<String>,

        /// Inclusive upper bound, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        date_to: Option<String>,

        /// Number of students to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::InitDb { config } => init_db(load_config(&config)?),
        Command::Seed { config, first_day } => seed_db(load_config(&config)?, first_day),
        Command::Serve { config, port } => {
            let mut config = load_config(&config)?;
            if let Some(port) = port {
                config.api_port = port;
                config.validate()?;
            }
            serve::serve_api(config)
        }
        Command::Summary {
            config,
            department,
            subject,
            date_from,
            date_to,
            limit,
        } => {
            let query = MonitorQuery {
                department,
                subject,
                date_from,
                date_to,
                ..Default::default()
            };
            summary(load_config(&config)?, query, limit)
        }
    }
}

fn load_config(path: &Path) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    Ok(ServiceConfig::load(path)?)
}

fn init_db(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let pool = db::open_database_pool(&config.database_path).await?;
        db::init_database_schema(&pool).await?;
        println!("Initialized database: {}", config.database_path.display());
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn seed_db(config: ServiceConfig, first_day: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let first_day: NaiveDate = match first_day {
        Some(raw) => parse_day(&raw)?,
        None => (Utc::now() - Duration::days(10)).date_naive(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let pool = db::open_database_pool(&config.database_path).await?;
        db::init_database_schema(&pool).await?;
        let written = seed::seed_demo_data(&pool, first_day).await?;
        println!("Seeded database: {}", config.database_path.display());
        println!("  Departments: {}", written.departments);
        println!("  Subjects: {}", written.subjects);
        println!("  Faculty: {}", written.faculty);
        println!("  Students: {}", written.students);
        println!("  Lectures: {}", written.lectures);
        println!("  Attendance records: {}", written.attendance);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn summary(
    config: ServiceConfig,
    query: MonitorQuery,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let filters = query.to_filters()?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(async {
        let pool = db::open_database_pool(&config.database_path).await?;
        build_report(&pool, &filters).await
    })?;

    let s = &report.summary;
    println!("Students: {}", s.total_students);
    println!("Average attendance: {}%", s.average_attendance);
    println!(
        "Excellent: {}  Good: {}  Warning: {}  Critical: {}",
        s.excellent_count, s.good_count, s.warning_count, s.critical_count
    );

    let mut students = report.students;
    students.sort_by_key(|st| (st.attendance_percentage, st.roll_no.clone()));

    if !students.is_empty() {
        println!();
        println!("{:<12} {:<24} {:>9} {:>8}  Status", "Roll No", "Name", "Attended", "Percent");
    }
    for st in students.iter().take(limit) {
        println!(
            "{:<12} {:<24} {:>4}/{:<4} {:>7}%  {:?}",
            st.roll_no,
            st.name,
            st.sessions_attended,
            st.total_sessions,
            st.attendance_percentage,
            st.status
        );
    }
    Ok(())
}
