use bookstore_app::{
    auth::PgAuthService,
    database::{self, Db},
    domain::users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// Email address order confirmations are sent to
    #[arg(long)]
    email: String,

    /// Grant access to order administration
    #[arg(long)]
    admin: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<UserUuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    if args.email.trim().is_empty() {
        return Err("email cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let db = Db::new(pool);

    let user = PgUsersService::new(db.clone())
        .create_user(NewUser {
            uuid: args.user_uuid.unwrap_or_default(),
            email: args.email.trim().to_string(),
            is_admin: args.admin,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    let issued = PgAuthService::new(db)
        .issue_api_token(user.uuid)
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_email: {}", user.email);
    println!("user_is_admin: {}", user.is_admin);
    println!("token_uuid: {}", issued.metadata.uuid);
    println!("token_version: {}", issued.metadata.version.as_i16());
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
