use std::sync::OnceLock;

use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::middleware::CurrentUser;

/// Templates are embedded in the binary and registered once on first use.
fn tera() -> &'static Tera {
    static TEMPLATES: OnceLock<Tera> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("post_list.html", include_str!("../templates/post_list.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("signup.html", include_str!("../templates/signup.html")),
            ("delete.html", include_str!("../templates/delete.html")),
            ("home.html", include_str!("../templates/home.html")),
            ("posts.html", include_str!("../templates/posts.html")),
            ("create-post.html", include_str!("../templates/create-post.html")),
            ("terms-of-service.html", include_str!("../templates/terms-of-service.html")),
            ("privacy-policy.html", include_str!("../templates/privacy-policy.html")),
            ("admin/index.html", include_str!("../templates/admin/index.html")),
            ("admin/users.html", include_str!("../templates/admin/users.html")),
            ("admin/posts.html", include_str!("../templates/admin/posts.html")),
            ("admin/comments.html", include_str!("../templates/admin/comments.html")),
            ("admin/likes.html", include_str!("../templates/admin/likes.html")),
        ])
        .expect("embedded templates must parse");
        tera
    })
}

/// Base context every page gets: the current user (if any) and the pending
/// flash message.
pub fn page_context(user: Option<&CurrentUser>, flash: Option<&str>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("flash", &flash);
    ctx
}

pub fn render(name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(tera().render(name, ctx)?))
}
