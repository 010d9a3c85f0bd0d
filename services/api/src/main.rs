use fitscore_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("fitscore error: {err}");
        std::process::exit(1);
    }
}
