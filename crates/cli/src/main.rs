//! Printvend CLI - Command-line interface for the Printvend daemon
//!
//! Operator tooling: register machines, inspect queues, drive job
//! transitions, and watch the event feed. The user-facing flow (QR scan,
//! upload, checkout) lives in the web clients, not here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9631";

#[derive(Parser)]
#[command(name = "printvend-cli")]
#[command(about = "Printvend daemon CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "PRINTVEND_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register (or re-register) a machine
    Register {
        /// Machine key (e.g., LIB-2F)
        machine_key: String,

        /// Human-readable machine name
        #[arg(short, long)]
        name: String,

        /// Physical location
        #[arg(short, long)]
        location: String,

        /// Per-page rate in major currency units
        #[arg(short, long)]
        rate: Option<f64>,
    },

    /// Create a print job
    Create {
        /// Machine key
        machine_key: String,

        /// User name
        #[arg(short, long)]
        user: String,

        /// Uploaded file URL
        #[arg(long)]
        file_url: String,

        /// File name
        #[arg(long)]
        file_name: String,

        /// Total pages in the document
        #[arg(long)]
        total_pages: u32,

        /// Pages to print (e.g., "1-3,5")
        #[arg(long)]
        pages: String,

        /// Priority: 1 = urgent, 2 = normal
        #[arg(short, long, default_value = "2")]
        priority: i32,
    },

    /// Show the active queue for a machine
    Queue {
        /// Machine key
        machine_key: String,
    },

    /// Show a single job
    Job {
        /// Job ID
        job_id: String,
    },

    /// Drive a job status transition
    Update {
        /// Job ID
        job_id: String,

        /// Target status: printing, completed, failed
        status: String,

        /// Error message (failed only)
        #[arg(short, long)]
        error: Option<String>,
    },

    /// Create a payment order for a job
    Order {
        /// Job ID
        job_id: String,
    },

    /// Verify a signed payment confirmation
    Verify {
        /// Job ID
        job_id: String,

        /// Order ID from payment.order.v1
        #[arg(long)]
        order_id: String,

        /// Payment ID from the processor
        #[arg(long)]
        payment_id: String,

        /// Hex HMAC signature from the processor
        #[arg(long)]
        signature: String,
    },

    /// Send a heartbeat for a machine
    Heartbeat {
        /// Machine key
        machine_key: String,
    },

    /// Long-poll the event feed for a machine
    Events {
        /// Machine key
        machine_key: String,

        /// Milliseconds to wait for an event
        #[arg(short, long, default_value = "25000")]
        wait: u64,
    },

    /// Show system status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Tabled)]
struct QueueRow {
    position: usize,
    job_id: String,
    user: String,
    file: String,
    priority: String,
    status: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn str_of(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("-")
        .to_string()
}

fn priority_label(value: &serde_json::Value) -> String {
    match value.get("priority").and_then(|v| v.as_i64()) {
        Some(1) => "urgent".to_string(),
        Some(2) => "normal".to_string(),
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}

fn print_job(job: &serde_json::Value) {
    println!("  {} {}", "Job:".bold(), str_of(job, "id"));
    println!("  {} {}", "Machine:".bold(), str_of(job, "machine_key"));
    println!("  {} {}", "User:".bold(), str_of(job, "user_name"));
    println!("  {} {}", "File:".bold(), str_of(job, "file_name"));
    println!(
        "  {} {} ({} pages)",
        "Pages:".bold(),
        str_of(job, "pages_spec"),
        job["pages_count"]
    );
    println!("  {} {}", "Priority:".bold(), priority_label(job));
    println!("  {} {}", "Status:".bold(), str_of(job, "status"));
    println!(
        "  {} {:.2} ({})",
        "Cost:".bold(),
        job["cost"].as_f64().unwrap_or(0.0),
        str_of(job, "payment_status")
    );
    if let Some(err) = job.get("error").and_then(|v| v.as_str()) {
        println!("  {} {}", "Error:".bold(), err.red());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Register {
            machine_key,
            name,
            location,
            rate,
        } => {
            let params = json!({
                "machine_key": machine_key,
                "name": name,
                "location": location,
                "rate_per_page": rate,
            });

            let result = call_rpc(&cli.rpc_url, "machine.register.v1", params).await?;

            println!("{}", "✓ Machine registered".green().bold());
            println!();
            println!("  {} {}", "Key:".bold(), str_of(&result["machine"], "machine_key"));
            println!("  {} {}", "Status:".bold(), str_of(&result["machine"], "status"));
            println!("  {} {}", "Connect URL:".bold(), str_of(&result, "connect_url"));
        }

        Commands::Create {
            machine_key,
            user,
            file_url,
            file_name,
            total_pages,
            pages,
            priority,
        } => {
            let params = json!({
                "machine_key": machine_key,
                "user_name": user,
                "file_url": file_url,
                "file_name": file_name,
                "total_pages": total_pages,
                "pages_spec": pages,
                "priority": priority,
            });

            let result = call_rpc(&cli.rpc_url, "job.create.v1", params).await?;

            println!("{}", "✓ Job created".green().bold());
            println!();
            print_job(&result["job"]);
            println!(
                "  {} {} of {}",
                "Position:".bold(),
                result["queue_position"],
                result["queue_length"]
            );
        }

        Commands::Queue { machine_key } => {
            let params = json!({ "machine_key": machine_key });
            let result = call_rpc(&cli.rpc_url, "job.queue.v1", params).await?;

            let queue = result["queue"].as_array().cloned().unwrap_or_default();
            if queue.is_empty() {
                println!("{}", format!("Queue for {} is empty", machine_key).yellow());
                return Ok(());
            }

            println!(
                "{}",
                format!("Queue for {} ({} jobs)", machine_key, queue.len())
                    .cyan()
                    .bold()
            );
            println!();

            let rows: Vec<QueueRow> = queue
                .iter()
                .enumerate()
                .map(|(i, job)| QueueRow {
                    position: i + 1,
                    job_id: str_of(job, "id"),
                    user: str_of(job, "user_name"),
                    file: str_of(job, "file_name"),
                    priority: priority_label(job),
                    status: str_of(job, "status"),
                })
                .collect();

            println!("{}", Table::new(rows));
        }

        Commands::Job { job_id } => {
            let params = json!({ "job_id": job_id });
            let result = call_rpc(&cli.rpc_url, "job.status.v1", params).await?;
            print_job(&result["job"]);
        }

        Commands::Update {
            job_id,
            status,
            error,
        } => {
            let params = json!({
                "job_id": job_id,
                "status": status,
                "error": error,
            });

            let result = call_rpc(&cli.rpc_url, "job.update.v1", params).await?;

            println!(
                "{}",
                format!("✓ Job {} -> {}", job_id, str_of(&result["job"], "status"))
                    .green()
                    .bold()
            );
        }

        Commands::Order { job_id } => {
            let params = json!({ "job_id": job_id });
            let result = call_rpc(&cli.rpc_url, "payment.order.v1", params).await?;

            println!("{}", "✓ Order created".green().bold());
            println!();
            println!("  {} {}", "Order ID:".bold(), str_of(&result, "order_id"));
            println!(
                "  {} {} {} (minor units)",
                "Amount:".bold(),
                result["amount_minor"],
                str_of(&result, "currency")
            );
        }

        Commands::Verify {
            job_id,
            order_id,
            payment_id,
            signature,
        } => {
            let params = json!({
                "job_id": job_id,
                "order_id": order_id,
                "payment_id": payment_id,
                "signature": signature,
            });

            let result = call_rpc(&cli.rpc_url, "payment.verify.v1", params).await?;

            println!("{}", "✓ Payment verified".green().bold());
            println!();
            print_job(&result["job"]);
        }

        Commands::Heartbeat { machine_key } => {
            let params = json!({ "machine_key": machine_key });
            let result = call_rpc(&cli.rpc_url, "machine.heartbeat.v1", params).await?;

            println!(
                "{}",
                format!(
                    "✓ Heartbeat recorded; {} is {}",
                    machine_key,
                    str_of(&result["machine"], "status")
                )
                .green()
            );
        }

        Commands::Events { machine_key, wait } => {
            let params = json!({ "machine_key": machine_key, "wait_ms": wait });
            let result = call_rpc(&cli.rpc_url, "machine.events.v1", params).await?;

            let events = result["events"].as_array().cloned().unwrap_or_default();
            if events.is_empty() {
                println!("{}", "No events within the wait window".yellow());
            } else {
                for event in events {
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
            }
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Queued:".bold(), stats["queued_jobs"]);
                    println!("  {} {}", "Printing:".bold(), stats["printing_jobs"]);
                    println!("  {} {}", "Completed:".bold(), stats["completed_jobs"]);
                    println!("  {} {}", "Failed:".bold(), stats["failed_jobs"]);
                    println!();
                    println!(
                        "  {} {} online / {} printing / {} offline",
                        "Machines:".bold(),
                        stats["machines_online"],
                        stats["machines_printing"],
                        stats["machines_offline"]
                    );
                    println!();
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
