use std::num::NonZeroU32;

use {
    anyhow::{Context, bail},
    clap::{Args, Subcommand},
};

use autodelete_policy::{ChannelPolicy, PolicyStore, SqlitePolicyStore};

#[derive(Subcommand)]
pub enum PolicyAction {
    /// List every configured channel.
    List,
    /// Print one channel's policy as JSON.
    Get { channel_id: String },
    /// Create or update a channel's policy.
    Set(SetArgs),
}

#[derive(Args)]
pub struct SetArgs {
    channel_id: String,
    /// Server (guild) the channel belongs to. Required when the channel has no policy yet.
    #[arg(long)]
    server: Option<String>,
    /// New delay in minutes.
    #[arg(long)]
    minutes: Option<NonZeroU32>,
    #[arg(long, conflicts_with = "disable")]
    enable: bool,
    #[arg(long)]
    disable: bool,
}

pub async fn handle_policy(action: PolicyAction) -> anyhow::Result<()> {
    let config = autodelete_config::discover_and_load();
    let pool = autodelete_gateway::open_database(&config.database).await?;
    let store = SqlitePolicyStore::with_pool(pool.clone())
        .default_delay_minutes(config.policy.default_delay_minutes);

    let result = match action {
        PolicyAction::List => list(&store).await,
        PolicyAction::Get { channel_id } => match store.get(&channel_id).await? {
            Some(policy) => print_json(&policy),
            None => bail!("no policy stored for channel {channel_id}"),
        },
        PolicyAction::Set(args) => {
            let policy = apply_set(&store, &args).await?;
            print_json(&policy)
        },
    };

    pool.close().await;
    result
}

async fn list(store: &dyn PolicyStore) -> anyhow::Result<()> {
    let policies = store.list().await?;
    if policies.is_empty() {
        println!("No channel policies stored.");
        return Ok(());
    }
    println!("{:<22} {:<22} {:<8} MINUTES", "CHANNEL", "SERVER", "ENABLED");
    for p in policies {
        println!(
            "{:<22} {:<22} {:<8} {}",
            p.channel_id, p.server_id, p.enabled, p.delay_minutes
        );
    }
    Ok(())
}

fn print_json(policy: &ChannelPolicy) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(policy)?);
    Ok(())
}

async fn apply_set(store: &dyn PolicyStore, args: &SetArgs) -> anyhow::Result<ChannelPolicy> {
    let mut policy = match (store.get(&args.channel_id).await?, &args.server) {
        (Some(existing), _) => existing,
        (None, Some(server)) => store.get_or_create(&args.channel_id, server).await?,
        (None, None) => bail!(
            "channel {} has no policy yet; pass --server to create one",
            args.channel_id
        ),
    };

    if args.enable {
        policy.enable(args.minutes);
    } else {
        if let Some(minutes) = args.minutes {
            policy.set_delay(minutes);
        }
        if args.disable {
            policy.disable();
        }
    }

    store
        .save(&policy)
        .await
        .with_context(|| format!("failed to save policy for channel {}", args.channel_id))?;
    Ok(policy)
}
