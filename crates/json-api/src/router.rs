//! App Router

use salvo::Router;

use crate::{admin, auth, books, cart, checkout, orders};

/// Every authenticated route. Routes under `admin` also require the admin flag.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("books")
                .get(books::index::handler)
                .push(Router::with_path("{book}").get(books::get::handler)),
        )
        .push(
            Router::with_path("cart")
                .get(cart::get::handler)
                .push(Router::with_path("coupon").post(cart::coupon::handler))
                .push(
                    Router::with_path("items")
                        .post(cart::items::create::handler)
                        .push(
                            Router::with_path("{item}")
                                .put(cart::items::update::handler)
                                .delete(cart::items::delete::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("checkout")
                .get(checkout::preview::handler)
                .post(checkout::place::handler),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .push(Router::with_path("{number}").get(orders::get::handler)),
        )
        .push(
            Router::with_path("admin")
                .hoop(auth::admin::handler)
                .push(
                    Router::with_path("orders")
                        .get(admin::orders::handler)
                        .push(
                            Router::with_path("{order}/status").put(admin::status::handler),
                        ),
                ),
        )
}
