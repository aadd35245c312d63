use shadowtrace::cli::ShadowTraceCLI;
use shadowtrace::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    ShadowTraceCLI::run().await
}
