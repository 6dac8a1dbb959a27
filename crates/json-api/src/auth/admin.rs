//! Admin guard.

use salvo::prelude::*;
use tracing::warn;

use crate::extensions::*;

/// Reject callers without the admin flag. Must run after the auth middleware.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let allowed = match depot.current_user_or_401() {
        Ok(user) if user.is_admin => true,
        Ok(user) => {
            warn!(user_uuid = %user.uuid, "non-admin attempted an admin route");

            res.render(StatusError::forbidden().brief("Administrator access required"));

            false
        }
        Err(error) => {
            res.render(error);

            false
        }
    };

    if !allowed {
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{admin, customer, inject_user};

    use super::*;

    #[salvo::handler]
    async fn secret(res: &mut Response) {
        res.render("secret");
    }

    #[tokio::test]
    async fn test_admin_passes() -> TestResult {
        let service = Service::new(
            Router::new()
                .hoop(inject_user(admin()))
                .hoop(handler)
                .get(secret),
        );

        let mut res = TestClient::get("http://example.com").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "secret");

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_gets_403() -> TestResult {
        let service = Service::new(
            Router::new()
                .hoop(inject_user(customer()))
                .hoop(handler)
                .get(secret),
        );

        let res = TestClient::get("http://example.com").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_gets_401() -> TestResult {
        let service = Service::new(Router::new().hoop(handler).get(secret));

        let res = TestClient::get("http://example.com").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
