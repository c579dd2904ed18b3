use anyhow::Result;

#[actix_web::main]
async fn main() -> Result<()> {
    tidewater_crm_server::run().await?;
    Ok(())
}
