use super::handlers::{auth, health, messages};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

/// The generated `OpenAPI` document, derived from the router wiring.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router and `OpenAPI` document in one place.
///
/// Endpoints registered here via `.routes(routes!(...))` are both served and
/// documented. The root route and the POST alias for message deletion are
/// added outside and stay out of the document.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::signup::signup))
        .routes(routes!(auth::verification::verify_code))
        .routes(routes!(auth::signin::signin))
        .routes(routes!(auth::reset::request_reset))
        .routes(routes!(auth::reset::reset_password))
        .routes(routes!(auth::username::unique_username))
        .routes(routes!(messages::submit::send_message))
        .routes(routes!(messages::inbox::get_messages))
        .routes(routes!(
            messages::inbox::accept_status,
            messages::inbox::accept_update
        ))
        .routes(routes!(messages::inbox::delete_message));

    let mut account_tag = Tag::new("account");
    account_tag.description = Some("Signup, verification, and password reset".to_string());

    let mut inbox_tag = Tag::new("inbox");
    inbox_tag.description = Some("Anonymous message submission and inbox management".to_string());

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service health".to_string());

    router.get_openapi_mut().tags = Some(vec![account_tag, inbox_tag, health_tag]);

    router
}

// Info block from Cargo.toml metadata.
fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // First Cargo author only, in "Name <email>" form.
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next()?.trim();

    let (name, email) = match primary.split_once('<') {
        Some((name, rest)) => (
            optional_str(name),
            optional_str(rest.trim_end_matches('>')),
        ),
        None => (optional_str(primary), None),
    };

    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name;
    contact.email = email;
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier.clone());
    license.identifier = Some(identifier);
    Some(license)
}

fn optional_str(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Anomsg"));
            assert_eq!(contact.email.as_deref(), Some("team@anomsg.dev"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "account"));
        assert!(tags.iter().any(|tag| tag.name == "inbox"));
        assert!(spec.paths.paths.contains_key("/signup"));
        assert!(spec.paths.paths.contains_key("/codeverification"));
        assert!(spec.paths.paths.contains_key("/sendmessage"));
        assert!(spec.paths.paths.contains_key("/delete-message/{message_id}"));
    }
}
