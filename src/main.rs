#[tokio::main]
async fn main() {
    if let Err(e) = user_feedback::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
