use std::time::Duration;

use central_client::CentralClient;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("central=info")))
        .init();

    let identity_id: i64 = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: basic <identity-id>"))?
        .parse()?;

    let client = CentralClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_span(tracing::info_span!("central", identity_id));

    let lookup = async {
        let user = client.get_user_by_identity(identity_id).await?;
        let memberships = client.get_memberships_by_identity(identity_id).await?;
        Ok::<_, central_client::CentralError>((user, memberships))
    };
    let (user, memberships) = tokio::time::timeout(Duration::from_secs(30), lookup).await??;

    match user {
        Some(user) => println!("{} (user {}, admin: {})", user.name, user.id, user.admin),
        None => println!("no user for identity {identity_id}"),
    }
    for membership in memberships {
        println!(
            "organization {} as {:?}",
            membership.organization_id, membership.role
        );
    }

    Ok(())
}
