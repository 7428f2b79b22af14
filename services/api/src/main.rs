use housing_allocation_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("housing allocation error: {err}");
        std::process::exit(1);
    }
}
