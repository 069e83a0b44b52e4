mod cli;

use clap::Parser;
use labor_registry::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    importers::{self, catottg, dictionaries, employers, job_titles, kp, kved, speciality, vacancies},
    routes,
    utils::time::now,
    AppState,
};
use sqlx::PgPool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    match cli.command {
        Command::Serve => serve(pool).await?,
        Command::LoadCatottg { file } => println!("{}", catottg::run(&pool, &file).await?),
        Command::LoadKved { file } => println!("{}", kved::run(&pool, &file).await?),
        Command::LoadKp { file } => println!("{}", kp::run(&pool, &file).await?),
        Command::LoadJobTitles { file } => println!("{}", job_titles::run(&pool, &file).await?),
        Command::LoadSpeciality { file } => println!("{}", speciality::run(&pool, &file).await?),
        Command::LoadDictionaries => println!("{}", dictionaries::seed(&pool).await?),
        Command::ImportEmployers { file, owner } => {
            println!("{}", employers::run(&pool, &file, &owner).await?)
        }
        Command::ImportVacancies { file } => println!("{}", vacancies::run(&pool, &file).await?),
        Command::CleanupVacancies => {
            let count =
                importers::cleanup::deactivate_stale(&pool, now(), config.vacancy_max_age_days).await?;
            println!("Deactivated {} vacancies", count);
        }
    }

    Ok(())
}

async fn serve(pool: PgPool) -> anyhow::Result<()> {
    let config = get_config();
    let app_state = AppState::new(pool.clone(), config.require_jwt_secret()?, config.page_size);

    // Keep the scheduler alive for the lifetime of the server.
    let _scheduler = match &config.vacancy_cleanup_cron {
        Some(cron) => Some(schedule_cleanup(pool, cron, config.vacancy_max_age_days).await?),
        None => None,
    };

    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn schedule_cleanup(pool: PgPool, cron: &str, max_age_days: i64) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let job = Job::new_async(cron, move |_id, _scheduler| {
        let pool = pool.clone();
        Box::pin(async move {
            match importers::cleanup::deactivate_stale(&pool, now(), max_age_days).await {
                Ok(count) => info!("Scheduled cleanup deactivated {} vacancies", count),
                Err(e) => tracing::error!("Scheduled vacancy cleanup failed: {:?}", e),
            }
        })
    })?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("Vacancy cleanup scheduled with '{}'", cron);
    Ok(scheduler)
}
