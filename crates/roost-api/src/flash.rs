use axum_extra::extract::cookie::{Cookie, CookieJar};

pub const FLASH_COOKIE: &str = "roost_flash";

/// One-shot notices carried across a redirect. The cookie stores a short
/// code rather than free text, so nothing needs escaping; the next rendered
/// page resolves the code and clears the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    SignedUp,
    LoggedIn,
    LoggedOut,
    AccountDeleted,
    PostCreated,
    PostDeleted,
    PostMissing,
    CommentDeleted,
    CommentMissing,
    UserMissing,
    Forbidden,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::SignedUp => "signed-up",
            Flash::LoggedIn => "logged-in",
            Flash::LoggedOut => "logged-out",
            Flash::AccountDeleted => "account-deleted",
            Flash::PostCreated => "post-created",
            Flash::PostDeleted => "post-deleted",
            Flash::PostMissing => "post-missing",
            Flash::CommentDeleted => "comment-deleted",
            Flash::CommentMissing => "comment-missing",
            Flash::UserMissing => "user-missing",
            Flash::Forbidden => "forbidden",
        }
    }

    pub fn from_code(code: &str) -> Option<Flash> {
        let flash = match code {
            "signed-up" => Flash::SignedUp,
            "logged-in" => Flash::LoggedIn,
            "logged-out" => Flash::LoggedOut,
            "account-deleted" => Flash::AccountDeleted,
            "post-created" => Flash::PostCreated,
            "post-deleted" => Flash::PostDeleted,
            "post-missing" => Flash::PostMissing,
            "comment-deleted" => Flash::CommentDeleted,
            "comment-missing" => Flash::CommentMissing,
            "user-missing" => Flash::UserMissing,
            "forbidden" => Flash::Forbidden,
            _ => return None,
        };
        Some(flash)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::SignedUp => "Welcome to Roost, your account is ready",
            Flash::LoggedIn => "Logged in",
            Flash::LoggedOut => "Logged out",
            Flash::AccountDeleted => "Your account has been deleted",
            Flash::PostCreated => "Posted",
            Flash::PostDeleted => "Post deleted",
            Flash::PostMissing => "That post does not exist",
            Flash::CommentDeleted => "Comment deleted",
            Flash::CommentMissing => "That comment does not exist",
            Flash::UserMissing => "That user does not exist",
            Flash::Forbidden => "You do not have permission to do that",
        }
    }
}

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true),
    )
}

/// Pop the pending flash, if any, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<&'static str>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|c| Flash::from_code(c.value()))
        .map(Flash::message);

    let jar = if message.is_some() || jar.get(FLASH_COOKIE).is_some() {
        jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"))
    } else {
        jar
    };

    (jar, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for flash in [
            Flash::SignedUp,
            Flash::LoggedIn,
            Flash::LoggedOut,
            Flash::AccountDeleted,
            Flash::PostCreated,
            Flash::PostDeleted,
            Flash::PostMissing,
            Flash::CommentDeleted,
            Flash::CommentMissing,
            Flash::UserMissing,
            Flash::Forbidden,
        ] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("garbage"), None);
    }

    #[test]
    fn take_clears_the_cookie() {
        let jar = set(CookieJar::new(), Flash::PostDeleted);
        let (jar, message) = take(jar);
        assert_eq!(message, Some("Post deleted"));

        let (_, message) = take(jar);
        assert_eq!(message, None);
    }
}
