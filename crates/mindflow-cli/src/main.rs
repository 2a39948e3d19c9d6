use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use mindflow_config::DatabaseConfig;
use mindflow_core::permissions::ADMIN;
use mindflow_db::{MIGRATOR, PgPool, init_db_pool};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mindflow-cli")]
#[command(about = "Mindflow CLI - Administrative tools for Mindflow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Grant a staff permission to an existing user
    GrantStaff {
        /// Id of the user receiving the grant
        #[arg(short = 'u', long)]
        user_id: Uuid,

        /// Permission to add
        #[arg(short = 'p', long, default_value = ADMIN)]
        permission: String,
    },
    /// Remove a user's staff grant entirely
    RevokeStaff {
        /// Id of the user losing the grant
        #[arg(short = 'u', long)]
        user_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindflow_cli=info,mindflow_db=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::GrantStaff {
            user_id,
            permission,
        } => handle_grant_staff(&pool, user_id, &permission).await,
        Commands::RevokeStaff { user_id } => handle_revoke_staff(&pool, user_id).await,
    }
}

async fn handle_migrate(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    info!("Migrations applied");
    Ok(())
}

async fn handle_grant_staff(pool: &PgPool, user_id: Uuid, permission: &str) -> anyhow::Result<()> {
    let permission = permission.trim().to_lowercase();
    if permission.is_empty() {
        anyhow::bail!("permission must not be empty");
    }

    let user_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    if !user_exists {
        anyhow::bail!("no user with id {user_id}");
    }

    let permissions: Vec<String> = sqlx::query_scalar(
        r#"
        INSERT INTO staff_members (user_id, permissions)
        VALUES ($1, ARRAY[$2::TEXT])
        ON CONFLICT (user_id) DO UPDATE
        SET permissions = CASE
            WHEN $2::TEXT = ANY(staff_members.permissions) THEN staff_members.permissions
            ELSE array_append(staff_members.permissions, $2::TEXT)
        END
        RETURNING permissions
        "#,
    )
    .bind(user_id)
    .bind(&permission)
    .fetch_one(pool)
    .await
    .context("failed to upsert staff grant")?;

    info!(%user_id, ?permissions, "Staff grant updated");
    Ok(())
}

async fn handle_revoke_staff(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let result = sqlx::query("DELETE FROM staff_members WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to revoke staff grant")?;

    if result.rows_affected() == 0 {
        info!(%user_id, "User had no staff grant");
    } else {
        info!(%user_id, "Staff grant revoked");
    }
    Ok(())
}
