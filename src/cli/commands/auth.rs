use crate::cli::client::ApiClient;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::middleware::AuthUser;

pub async fn whoami(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let user: AuthUser = client.get("/api/auth/me").await?;

    match output_format {
        OutputFormat::Json => output_json(&user)?,
        OutputFormat::Text => {
            println!("User {} ({})", user.id, user.open_id);
            if let Some(name) = &user.name {
                println!("Name: {}", name);
            }
            if let Some(email) = &user.email {
                println!("Email: {}", email);
            }
            println!("Role: {}", user.role);
            println!("Server: {}", client.base_url());
        }
    }
    Ok(())
}
