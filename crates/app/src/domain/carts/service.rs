//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, debug, info};

use crate::{
    database::Db,
    domain::{
        books::repository::PgBooksRepository,
        carts::{
            data::NewCartItem,
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartRecord, QuantityUpdate},
            repositories::{PgCartItemsRepository, PgCartsRepository},
            stock::{check_add, check_quantity},
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    books_repository: PgBooksRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            books_repository: PgBooksRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.get_cart",
        skip(self),
        fields(user_uuid = %user, cart_uuid = tracing::field::Empty),
        err
    )]
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        let items = self
            .items_repository
            .list_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        cart.items.extend(items);

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(
            user_uuid = %user,
            book_uuid = %item.book_uuid,
            requested = item.quantity,
            quantity = tracing::field::Empty
        ),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let book = self
            .books_repository
            .get_book_stock(&mut tx, item.book_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::BookNotFound,
                error => error.into(),
            })?;

        let existing = self
            .items_repository
            .find_cart_item_by_book(&mut tx, cart.uuid, book.uuid)
            .await?;

        let quantity = check_add(
            &book.title,
            book.stock,
            existing.as_ref().map(|existing| existing.quantity),
            item.quantity,
        )?;

        Span::current().record("quantity", quantity);

        let saved = match existing {
            Some(existing) => {
                self.items_repository
                    .update_cart_item_quantity(&mut tx, cart.uuid, existing.uuid, quantity)
                    .await?
            }
            None => {
                self.items_repository
                    .create_cart_item(&mut tx, cart.uuid, book.uuid, quantity)
                    .await?
            }
        };

        tx.commit().await?;

        debug!(item_uuid = %saved.uuid, quantity, "cart item saved");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "carts.service.set_quantity",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn set_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<QuantityUpdate, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let existing = self
            .items_repository
            .get_cart_item(&mut tx, cart.uuid, item)
            .await?;

        if quantity <= 0 {
            self.items_repository
                .delete_cart_item(&mut tx, cart.uuid, existing.uuid)
                .await?;

            tx.commit().await?;

            info!("cart item removed by zero quantity");

            return Ok(QuantityUpdate::Removed);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let quantity = check_quantity(&existing.title, existing.stock, quantity)?;

        let updated = self
            .items_repository
            .update_cart_item_quantity(&mut tx, cart.uuid, existing.uuid, quantity)
            .await?;

        tx.commit().await?;

        Ok(QuantityUpdate::Updated(updated))
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart.uuid, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
/// The per-user shopping cart.
///
/// Every mutation checks the requested quantity against the book's stock first and leaves the
/// cart unchanged when the check fails.
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart with its items, creating an empty cart on first access.
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add units of a book, merging into the existing item for that book if there is one.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Set an item's quantity outright. Zero or less removes the item.
    async fn set_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<QuantityUpdate, CartsServiceError>;

    /// Remove an item from the user's cart.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError>;
}
