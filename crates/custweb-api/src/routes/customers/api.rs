//! Customer form submissions - HTMX partial responses
//!
//! Both endpoints answer with a notice fragment swapped into the form's
//! result box, so failures are reported with status 200.

use crate::AppState;
use axum::extract::Form;
use custweb_core::CustomerForm;

/// HTMX: create a customer
pub async fn htmx_customer_store(
    state: axum::extract::State<AppState>,
    form: Form<CustomerForm>,
) -> axum::response::Html<String> {
    let new_customer = match form.0.into_new_customer() {
        Ok(customer) => customer,
        Err(e) => return axum::response::Html(crate::notice_html("warning", &format!("新增失败：{}", e))),
    };

    match state.directory.create_customer(&new_customer).await {
        Ok(()) => {
            log::info!(target: "custweb::api", "Created customer {}", new_customer.email);
            axum::response::Html(format!(
                "{}<a href='/customers' class='text-sm text-indigo-600 hover:underline'>返回客户列表</a>",
                crate::notice_html("info", "客户新增成功")
            ))
        }
        Err(e) => {
            log::warn!(target: "custweb::api", "Create customer failed: {}", e);
            axum::response::Html(crate::notice_html("error", &format!("新增失败：{}", e.user_message())))
        }
    }
}

/// HTMX: update a customer
pub async fn htmx_customer_update(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
    form: Form<CustomerForm>,
) -> axum::response::Html<String> {
    let customer_id = path.0;
    let update = match form.0.into_update() {
        Ok(update) => update,
        Err(e) => return axum::response::Html(crate::notice_html("warning", &format!("更新失败：{}", e))),
    };

    match state.directory.update_customer(&customer_id, &update).await {
        Ok(()) => {
            log::info!(target: "custweb::api", "Updated customer {}", customer_id);
            axum::response::Html(crate::notice_html("info", "客户资料已更新"))
        }
        Err(e) => {
            log::warn!(target: "custweb::api", "Update customer {} failed: {}", customer_id, e);
            axum::response::Html(crate::notice_html("error", &format!("更新失败：{}", e.user_message())))
        }
    }
}
