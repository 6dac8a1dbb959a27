use bookstore_app::{
    database::{self, Db},
    domain::books::{
        BooksService, PgBooksService,
        data::NewBook,
        records::{BookFormat, BookUuid},
    },
};
use clap::Args;
use jiff::civil::Date;
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct CreateBookArgs {
    /// Book title
    #[arg(long)]
    title: String,

    /// Author name; created when not yet known
    #[arg(long)]
    author: String,

    /// Unit price, e.g. 25.99
    #[arg(long)]
    price: Decimal,

    /// Copies available for sale
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// `physical` or `digital`
    #[arg(long, default_value = "physical")]
    format: BookFormat,

    /// Category name; repeat for several
    #[arg(long = "category")]
    categories: Vec<String>,

    #[arg(long, default_value = "")]
    description: String,

    /// Publication date (YYYY-MM-DD)
    #[arg(long)]
    published_on: Option<Date>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateBookArgs) -> Result<(), String> {
    if args.price.is_sign_negative() {
        return Err("price cannot be negative".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let book = PgBooksService::new(Db::new(pool))
        .create_book(NewBook {
            uuid: BookUuid::new(),
            title: args.title,
            author: args.author,
            description: args.description,
            price: args.price,
            stock: args.stock,
            format: args.format,
            categories: args.categories,
            published_on: args.published_on,
        })
        .await
        .map_err(|error| format!("failed to create book: {error}"))?;

    println!("book_uuid: {}", book.uuid);
    println!("book_title: {}", book.title);
    println!("book_price: {}", book.price);
    println!("book_stock: {}", book.stock);

    if !book.categories.is_empty() {
        println!("book_categories: {}", book.categories.join(", "));
    }

    Ok(())
}
