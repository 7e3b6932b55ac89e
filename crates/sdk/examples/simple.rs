//! Simple SDK Example
//!
//! Walks a job through the full kiosk flow against a running daemon.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    PRINTVEND_PAYMENT_SECRET=dev-secret cargo run --package printvend-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use printvend_sdk::{CreateJobRequest, PrintvendClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Printvend SDK - Simple Example");
    println!("================================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = PrintvendClient::connect("http://127.0.0.1:9631").await?;
    println!("   ✓ Connected\n");

    // 2. Register a machine and bring its console online
    println!("2. Registering machine...");
    let registered = client
        .register_machine("demo-machine", "Demo Kiosk", "Example Hall", Some(2.0))
        .await?;
    println!("   ✓ Machine registered:");
    println!("     - Key: {}", registered.machine.machine_key);
    println!("     - Connect URL: {}\n", registered.connect_url);

    let console = client.console("demo-machine").await?;
    println!("   ✓ Console online (session {})\n", console.session_id);

    // 3. Create a print job
    println!("3. Creating a print job...");
    let created = client
        .create_job(CreateJobRequest {
            machine_key: "demo-machine".to_string(),
            user_name: "example-user".to_string(),
            file_url: "https://files.example/report.pdf".to_string(),
            file_name: "report.pdf".to_string(),
            total_pages: 12,
            pages_spec: "1-4,7".to_string(),
            priority: 2,
        })
        .await?;

    println!("   ✓ Job created:");
    println!("     - ID: {}", created.job.id);
    println!("     - Pages: {}", created.job.pages_count);
    println!("     - Cost: {:.2}", created.job.cost);
    println!(
        "     - Queue position: {} of {}\n",
        created.queue_position, created.queue_length
    );

    // 4. Create a payment order
    println!("4. Creating payment order...");
    let order = client.create_order(&created.job.id).await?;
    println!("   ✓ Order created:");
    println!("     - Order ID: {}", order.order_id);
    println!(
        "     - Amount: {} {} (minor units)\n",
        order.amount_minor, order.currency
    );

    // payment.verify.v1 would come next with the processor's signed
    // confirmation; there is no processor in this example, so the job
    // stays pending and we drive the print lifecycle directly.

    // 5. Drive the job through the print lifecycle
    println!("5. Printing...");
    let printing = client.update_job(&created.job.id, "printing", None).await?;
    println!("   ✓ Job is {}", printing.job.status);

    let completed = client.update_job(&created.job.id, "completed", None).await?;
    println!("   ✓ Job is {}\n", completed.job.status);

    // 6. System statistics
    println!("6. Fetching stats...");
    let stats = client.stats().await?;
    println!("   ✓ Stats:");
    println!("     - Queued: {}", stats.queued_jobs);
    println!("     - Completed: {}", stats.completed_jobs);
    println!("     - Machines online: {}", stats.machines_online);

    // 7. Close the console session
    client.disconnect(&console.session_id).await?;
    println!("\n✓ Example completed successfully!");

    Ok(())
}
