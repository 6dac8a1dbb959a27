use bookstore_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, PgCouponsService, data::NewCoupon, records::CouponUuid},
};
use clap::Args;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Code customers enter at checkout
    #[arg(long)]
    code: String,

    /// Percentage discount, 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    discount: u8,

    /// Start of the validity window (RFC 3339); defaults to now
    #[arg(long)]
    starts_at: Option<Timestamp>,

    /// End of the validity window (RFC 3339)
    #[arg(long)]
    expires_at: Timestamp,

    /// Create the coupon switched off
    #[arg(long)]
    inactive: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let starts_at = args.starts_at.unwrap_or_else(Timestamp::now);

    if args.expires_at < starts_at {
        return Err("expires-at must not be before starts-at".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let coupon = PgCouponsService::new(Db::new(pool))
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code: args.code,
            discount: args.discount,
            starts_at,
            expires_at: args.expires_at,
            active: !args.inactive,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("coupon_code: {}", coupon.code);
    println!("coupon_discount: {}%", coupon.discount);
    println!("coupon_window: {} .. {}", coupon.starts_at, coupon.expires_at);
    println!("coupon_active: {}", coupon.active);

    Ok(())
}
