//! Customer page rendering - Full page endpoints
//!
//! Endpoints:
//! - page_customers: Customer list with past-year transaction totals
//! - page_customer_new: Create form
//! - page_customer_edit: Edit form for one customer

use crate::{ApiResult, AppState};
use custweb_client::{Customer, Gender};
use custweb_core::{summarize_customers, CoreError, FilterRange};
use custweb_utils::escape_html;

/// Customer list - every row carries the total of the past year
pub async fn page_customers(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let rows_html = match state.directory.list_customers().await {
        Ok(customers) => {
            let today = chrono::Local::now().date_naive();
            let range = FilterRange::last_months(today, state.config.transactions.summary_window_months);
            let summaries = summarize_customers(
                state.source.clone(),
                customers,
                range,
                state.config.request_timeout(),
                state.config.upstream.max_concurrent_requests,
            )
            .await;

            if summaries.is_empty() {
                "<tr><td colspan='5' class='px-4 py-6 text-center text-gray-500'>尚无客户资料</td></tr>".to_string()
            } else {
                summaries
                    .iter()
                    .map(|row| {
                        let id = urlencoding::encode(&row.customer.id);
                        format!(
                            r#"<tr class='border-b hover:bg-gray-50'>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-right font-mono'>{}</td>
                <td class='px-4 py-2 space-x-3'>
                    <a href='/customers/{}' class='text-indigo-600 hover:underline'>查看/编辑</a>
                    <a href='/customers/{}/transactions' class='text-indigo-600 hover:underline'>查看交易</a>
                </td>
            </tr>"#,
                            escape_html(&row.customer.name),
                            escape_html(&row.customer.email),
                            row.customer.gender.label(),
                            row.total_display(),
                            id,
                            id
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("")
            }
        }
        Err(e) => {
            let error = CoreError::network("customer list", &e);
            error.log("loading customer list");
            format!(
                "<tr><td colspan='5' class='px-4 py-6'>{}</td></tr>",
                crate::notice_html("error", &format!("无法获取客户资料：{}", e.user_message()))
            )
        }
    };

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>客户列表</h2>
            <a href='/customers/new' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>新增客户</a>
        </div>
        <div class='bg-white rounded-xl shadow-sm overflow-hidden'>
            <table class='w-full text-sm'>
                <thead class='bg-gray-50 text-gray-600'>
                    <tr>
                        <th class='px-4 py-2 text-left'>姓名</th>
                        <th class='px-4 py-2 text-left'>电子邮件</th>
                        <th class='px-4 py-2 text-left'>性别</th>
                        <th class='px-4 py-2 text-right'>过去一年的交易总额</th>
                        <th class='px-4 py-2 text-left'>操作</th>
                    </tr>
                </thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        rows_html
    );

    axum::response::Html(crate::page_response(&headers, "客户列表", "/customers", &inner_content))
}

fn gender_options(selected: Option<Gender>) -> String {
    Gender::all()
        .iter()
        .map(|gender| {
            format!(
                "<option value='{}'{}>{}</option>",
                gender,
                if Some(*gender) == selected { " selected" } else { "" },
                gender.label()
            )
        })
        .collect()
}

/// Shared create/edit form; the password field only appears on create
fn customer_form(action: &str, customer: Option<&Customer>) -> String {
    let name = customer.map(|c| escape_html(&c.name)).unwrap_or_default();
    let email = customer.map(|c| escape_html(&c.email)).unwrap_or_default();
    let password_field = if customer.is_none() {
        r#"<div><label class='block text-sm text-gray-600 mb-1'>密码</label>
                <input type='password' name='password' required class='w-full px-3 py-2 border rounded-lg'></div>"#
    } else {
        ""
    };
    let submit_label = if customer.is_none() { "新增" } else { "提交修改" };

    format!(
        r#"<form hx-post='{}' hx-target='#form-result' hx-swap='innerHTML' class='bg-white rounded-xl shadow-sm p-6 space-y-4 max-w-lg'>
            <div><label class='block text-sm text-gray-600 mb-1'>姓名</label>
                <input type='text' name='name' value='{}' required class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1'>电子邮件</label>
                <input type='email' name='email' value='{}' required class='w-full px-3 py-2 border rounded-lg'></div>
            {}
            <div><label class='block text-sm text-gray-600 mb-1'>性别</label>
                <select name='gender' class='w-full px-3 py-2 border rounded-lg'>{}</select></div>
            <div id='form-result'></div>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{}</button>
        </form>"#,
        action,
        name,
        email,
        password_field,
        gender_options(customer.map(|c| c.gender)),
        submit_label
    )
}

/// Create form
pub async fn page_customer_new(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    let inner_content = format!(
        r#"<div class='mb-6'><a href='/customers' class='text-sm text-indigo-600'>&larr; 返回客户列表</a>
            <h2 class='text-2xl font-bold mt-2'>新增客户</h2></div>
        {}"#,
        customer_form("/customers", None)
    );
    axum::response::Html(crate::page_response(&headers, "新增客户", "/customers", &inner_content))
}

/// Edit form for one customer
pub async fn page_customer_edit(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    path: axum::extract::Path<String>,
) -> ApiResult<axum::response::Html<String>> {
    let customer_id = path.0;
    let customer = state
        .directory
        .customer(&customer_id)
        .await
        .map_err(|e| CoreError::from_customer_lookup(&customer_id, &e))?;

    let registered = customer
        .registration_time
        .as_deref()
        .map(custweb_core::localize_time)
        .unwrap_or_else(|| "-".to_string());
    let action = format!("/customers/{}", urlencoding::encode(&customer.id));

    let inner_content = format!(
        r#"<div class='mb-6'><a href='/customers' class='text-sm text-indigo-600'>&larr; 返回客户列表</a>
            <h2 class='text-2xl font-bold mt-2'>{}</h2>
            <p class='text-sm text-gray-500'>注册时间：{}</p>
            <a href='{}/transactions' class='text-sm text-indigo-600 hover:underline'>查看交易</a></div>
        {}"#,
        escape_html(&customer.name),
        escape_html(&registered),
        action,
        customer_form(&action, Some(&customer))
    );

    Ok(axum::response::Html(crate::page_response(&headers, "客户资料", "/customers", &inner_content)))
}
