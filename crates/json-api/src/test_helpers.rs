//! Test helpers.

use std::sync::Arc;

use bookstore_app::{
    auth::{AuthenticatedUser, MockAuthService},
    context::AppContext,
    domain::{
        books::MockBooksService, carts::MockCartsService, coupons::MockCouponsService,
        orders::MockOrdersService, users::MockUsersService,
    },
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

/// Service mocks backing a test router. A mock without expectations fails on any call.
pub(crate) struct TestServices {
    pub(crate) books: MockBooksService,
    pub(crate) carts: MockCartsService,
    pub(crate) coupons: MockCouponsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) users: MockUsersService,
    pub(crate) auth: MockAuthService,
}

impl TestServices {
    pub(crate) fn strict() -> Self {
        Self {
            books: MockBooksService::new(),
            carts: MockCartsService::new(),
            coupons: MockCouponsService::new(),
            orders: MockOrdersService::new(),
            users: MockUsersService::new(),
            auth: MockAuthService::new(),
        }
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            books: Arc::new(self.books),
            carts: Arc::new(self.carts),
            coupons: Arc::new(self.coupons),
            orders: Arc::new(self.orders),
            users: Arc::new(self.users),
            auth: Arc::new(self.auth),
        })
    }
}

pub(crate) fn customer() -> AuthenticatedUser {
    AuthenticatedUser {
        uuid: Uuid::from_u128(1).into(),
        email: "customer@example.com".to_string(),
        is_admin: false,
    }
}

pub(crate) fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        uuid: Uuid::from_u128(2).into(),
        email: "admin@example.com".to_string(),
        is_admin: true,
    }
}

/// Stands in for the auth middleware by injecting a fixed caller.
pub(crate) struct InjectUser(AuthenticatedUser);

pub(crate) fn inject_user(user: AuthenticatedUser) -> InjectUser {
    InjectUser(user)
}

#[salvo::handler]
impl InjectUser {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_current_user(self.0.clone());
        ctrl.call_next(req, depot, res).await;
    }
}

/// Serve `route` as the default customer.
pub(crate) fn customer_service(services: TestServices, route: Router) -> Service {
    service_as(customer(), services, route)
}

pub(crate) fn service_as(user: AuthenticatedUser, services: TestServices, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(services.into_state()))
            .hoop(inject_user(user))
            .push(route),
    )
}
