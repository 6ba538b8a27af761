use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use garage_dispatch::config::ShopConfig;
use garage_dispatch::dispatcher::Dispatcher;
use garage_dispatch::scheduler::job::ServiceCategory;

#[derive(Parser, Debug)]
#[command(name = "garage-dispatch")]
#[command(version)]
#[command(about = "Assign vehicle service jobs to the mechanic pool")]
struct Args {
    /// Path to the workload state file
    #[arg(long, default_value = "data/workload.json")]
    state: PathBuf,

    /// Seed for default pool initialization (reproducible pools)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Submit a service job for assignment
    Submit {
        /// Estimated duration in hours
        #[arg(long)]
        duration: f64,

        /// Service category (General, Major, Brake, AC)
        #[arg(long, default_value = "General")]
        category: String,

        /// Vehicle model being serviced
        #[arg(long)]
        car_model: String,
    },

    /// Mark a service as completed (active or queued)
    Complete {
        /// Service id returned at submission
        service_id: String,
    },

    /// Print the current workload snapshot
    Status,

    /// Clear all state and reinitialize the default pool
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = ShopConfig::default().with_state_path(&args.state);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let dispatcher = Dispatcher::new(config);

    match args.command {
        Commands::Submit {
            duration,
            category,
            car_model,
        } => {
            // Unknown categories dispatch to the general pool
            let category: ServiceCategory = category.parse().unwrap_or(ServiceCategory::General);
            let result = dispatcher.assign(duration, category, &car_model).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Complete { service_id } => {
            if dispatcher.complete(&service_id).await {
                println!("{{\"completed\": \"{}\"}}", service_id);
            } else {
                eprintln!("Service not found: {}", service_id);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            let snapshot = dispatcher.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Reset => {
            dispatcher.reset().await;
            println!("{{\"reset\": true}}");
        }
    }

    Ok(())
}
