#[tokio::main]
async fn main() {
    washbooking_backend::run().await;
}
