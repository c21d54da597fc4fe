//! Pure render functions from auth state to fragments.
//!
//! Both regions are rebuilt wholesale on every transition. Identical input
//! always yields an identical fragment.

use crate::reducer::{Notice, NoticeLevel};
use crate::view::{Element, ElementKind, Fragment, Intent};
use lexicon_identity::{AuthState, User};

/// Id of the sign-out control in the authenticated header.
pub const SIGN_OUT_BUTTON_ID: &str = "signout-btn";
/// Id of the dashboard search box.
pub const SEARCH_INPUT_ID: &str = "search-input";

const SIGN_IN_HREF: &str = "login.html";
const REGISTER_HREF: &str = "register.html";

/// Name shown for `user`: display name, else the local part of the email,
/// else `"User"`.
///
/// # Examples
///
/// ```
/// use lexicon_identity::User;
/// use lexicon_page::render::display_name;
///
/// assert_eq!(display_name(&User::new("u1").with_display_name("Ann")), "Ann");
/// assert_eq!(display_name(&User::new("u2").with_email("bob@example.com")), "bob");
/// assert_eq!(display_name(&User::new("u3")), "User");
/// ```
#[must_use]
pub fn display_name(user: &User) -> String {
    user.display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            user.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .filter(|local| !local.is_empty())
        })
        .unwrap_or("User")
        .to_string()
}

/// Header region: sign-in affordances, or the signed-in profile.
#[must_use]
pub fn render_auth_section(state: &AuthState) -> Fragment {
    match state {
        AuthState::SignedOut => Fragment::single(
            Element::container("auth-links")
                .with_child(link("signin-link", "Sign In", SIGN_IN_HREF))
                .with_child(link("register-link", "Register", REGISTER_HREF)),
        ),
        AuthState::SignedIn(user) => {
            let name = display_name(user);
            Fragment::single(
                Element::container("user-profile")
                    .with_child(avatar(user, &name))
                    .with_child(Element::text(name).with_id("user-name"))
                    .with_child(
                        Element::new(ElementKind::Button)
                            .with_id(SIGN_OUT_BUTTON_ID)
                            .with_text("Sign Out"),
                    ),
            )
        },
    }
}

/// Main region: welcome hero, or the dashboard.
#[must_use]
pub fn render_main_content(state: &AuthState) -> Fragment {
    match state {
        AuthState::SignedOut => Fragment::single(
            Element::container("welcome")
                .with_child(Element::new(ElementKind::Heading).with_text("Welcome to Lexicon"))
                .with_child(Element::text(
                    "Build your vocabulary one word at a time. Sign in to start collecting words.",
                ))
                .with_child(link("hero-signin", "Get Started", SIGN_IN_HREF)),
        ),
        AuthState::SignedIn(user) => Fragment::single(
            Element::container("dashboard")
                .with_child(
                    Element::new(ElementKind::Heading)
                        .with_text(format!("Welcome back, {}!", display_name(user))),
                )
                .with_child(Element::container("stats").with_children([
                    counter("stat-total-words", "Total Words"),
                    counter("stat-categories", "Categories"),
                    counter("stat-practice-sessions", "Practice Sessions"),
                ]))
                .with_child(Element::container("quick-actions").with_children([
                    quick_action("action-add-word", "Add Word", Intent::AddWord),
                    quick_action(
                        "action-view-vocabulary",
                        "View Vocabulary",
                        Intent::ViewVocabulary,
                    ),
                    quick_action("action-practice", "Practice", Intent::Practice),
                ]))
                .with_child(
                    Element::new(ElementKind::Input {
                        placeholder: "Search your vocabulary...".to_string(),
                    })
                    .with_id(SEARCH_INPUT_ID)
                    .with_intent(Intent::Search(String::new())),
                ),
        ),
    }
}

/// Notification region.
#[must_use]
pub fn render_notices(notices: &[Notice]) -> Fragment {
    if notices.is_empty() {
        return Fragment::default();
    }

    Fragment::single(Element::container("notices").with_children(notices.iter().map(
        |notice| {
            Element::new(ElementKind::Notice {
                level: notice_level(notice.level).to_string(),
            })
            .with_id(format!("notice-{}", notice.id))
            .with_text(notice.message.clone())
        },
    )))
}

const fn notice_level(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "success",
        NoticeLevel::Error => "error",
    }
}

fn link(id: &str, text: &str, href: &str) -> Element {
    Element::new(ElementKind::Link {
        href: href.to_string(),
    })
    .with_id(id)
    .with_text(text)
}

fn avatar(user: &User, name: &str) -> Element {
    match user.photo_url.as_deref() {
        Some(src) => Element::new(ElementKind::Image {
            src: src.to_string(),
            alt: name.to_string(),
        })
        .with_id("user-avatar"),
        None => {
            let initial = name
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect::<String>())
                .unwrap_or_default();
            Element::text(initial).with_id("user-avatar")
        },
    }
}

fn counter(id: &str, label: &str) -> Element {
    Element::new(ElementKind::Container)
        .with_child(Element::text("0").with_id(id))
        .with_child(Element::text(label))
}

fn quick_action(id: &str, text: &str, intent: Intent) -> Element {
    Element::new(ElementKind::Button)
        .with_id(id)
        .with_text(text)
        .with_intent(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User::new("u1").with_display_name("Ann")
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(display_name(&ann()), "Ann");
        assert_eq!(
            display_name(&User::new("u2").with_display_name("  ").with_email("zed@x.io")),
            "zed"
        );
        assert_eq!(display_name(&User::new("u3").with_email("@x.io")), "User");
        assert_eq!(display_name(&User::new("u4")), "User");
    }

    #[test]
    fn test_anonymous_header_has_sign_in_links() {
        let fragment = render_auth_section(&AuthState::SignedOut);
        assert!(fragment.contains("signin-link"));
        assert!(fragment.contains("register-link"));
        assert!(!fragment.contains(SIGN_OUT_BUTTON_ID));
    }

    #[test]
    fn test_authenticated_header_shows_name_and_sign_out() {
        let fragment = render_auth_section(&AuthState::SignedIn(ann()));
        assert_eq!(
            fragment.find("user-name").and_then(|e| e.text.as_deref()),
            Some("Ann")
        );
        assert_eq!(
            fragment.find("user-avatar").and_then(|e| e.text.as_deref()),
            Some("A")
        );
        assert!(fragment.contains(SIGN_OUT_BUTTON_ID));
    }

    #[test]
    fn test_avatar_prefers_photo() {
        let user = ann().with_photo_url("https://img.example.com/ann.png");
        let fragment = render_auth_section(&AuthState::SignedIn(user));
        assert!(matches!(
            fragment.find("user-avatar").map(|e| &e.kind),
            Some(ElementKind::Image { .. })
        ));
    }

    #[test]
    fn test_dashboard_has_zeroed_counters_and_actions() {
        let fragment = render_main_content(&AuthState::SignedIn(ann()));

        for id in ["stat-total-words", "stat-categories", "stat-practice-sessions"] {
            assert_eq!(fragment.find(id).and_then(|e| e.text.as_deref()), Some("0"));
        }
        let text = fragment.text_content();
        assert!(text.contains("Total Words"));
        assert!(text.contains("Practice Sessions"));
        assert!(text.contains("Welcome back, Ann!"));

        let intents: Vec<_> = fragment.intents().into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            intents,
            vec![
                "action-add-word",
                "action-view-vocabulary",
                "action-practice",
                SEARCH_INPUT_ID
            ]
        );
    }

    #[test]
    fn test_signed_out_main_content_is_welcome() {
        let fragment = render_main_content(&AuthState::SignedOut);
        assert!(fragment.contains("welcome"));
        assert!(!fragment.contains("dashboard"));
        assert!(fragment.intents().is_empty());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let state = AuthState::SignedIn(ann());
        assert_eq!(render_auth_section(&state), render_auth_section(&state));
        assert_eq!(render_main_content(&state), render_main_content(&state));
    }
}
