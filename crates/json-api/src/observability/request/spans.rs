//! Route templates for request spans.

use bookstore_app::domain::orders::number::OrderNumber;
use uuid::Uuid;

/// Replace identifiers in `path` with placeholders so spans group by route.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut template = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            template.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            template.push_str("{uuid}");
        } else if segment.parse::<OrderNumber>().is_ok() {
            template.push_str("{number}");
        } else {
            template.push_str(segment);
        }
    }

    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_replaced() {
        let uuid = Uuid::now_v7();

        assert_eq!(
            route_template(&format!("/cart/items/{uuid}")),
            "/cart/items/{uuid}"
        );
        assert_eq!(route_template("/orders/0A1B2C3D4E"), "/orders/{number}");
    }

    #[test]
    fn test_static_paths_are_unchanged() {
        assert_eq!(route_template("/"), "/");
        assert_eq!(route_template("/checkout"), "/checkout");
        assert_eq!(route_template("/admin/orders"), "/admin/orders");
    }
}
