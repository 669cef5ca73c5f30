//! Generator form submissions - HTMX partial responses

use std::collections::HashMap;

use crate::routes::form_u32;
use crate::AppState;
use axum::extract::Form;
use custweb_core::{CoreResult, GenerationRequest};

async fn submit(state: &AppState, request: CoreResult<GenerationRequest>) -> axum::response::Html<String> {
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            let reason = match e {
                custweb_core::CoreError::InvalidInput { reason, .. } => reason,
                other => other.to_string(),
            };
            return axum::response::Html(crate::notice_html("warning", &reason));
        }
    };

    match request.submit(state.generator.as_ref()).await {
        Ok(()) => axum::response::Html(crate::notice_html(
            "info",
            &format!("资料产生成功：{}", request.success_message()),
        )),
        Err(e) => {
            e.log("data generation");
            let message = match e {
                custweb_core::CoreError::NetworkFailure { message, .. } => message,
                other => other.to_string(),
            };
            axum::response::Html(crate::notice_html("error", &format!("资料产生失败: {}", message)))
        }
    }
}

/// HTMX: generate customers
pub async fn htmx_generate_customers(
    state: axum::extract::State<AppState>,
    form: Form<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let num = match form_u32(&form, "num") {
        Ok(num) => num,
        Err(reason) => return axum::response::Html(crate::notice_html("warning", &reason)),
    };
    submit(&state, GenerationRequest::customers(num)).await
}

/// HTMX: generate transactions
pub async fn htmx_generate_transactions(
    state: axum::extract::State<AppState>,
    form: Form<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let parsed = form_u32(&form, "transactions_num")
        .and_then(|transactions_num| Ok((transactions_num, form_u32(&form, "customers_num")?)));
    let (transactions_num, customers_num) = match parsed {
        Ok(values) => values,
        Err(reason) => return axum::response::Html(crate::notice_html("warning", &reason)),
    };
    let request = GenerationRequest::transactions(
        transactions_num,
        customers_num,
        state.config.generator.max_transactions,
    );
    submit(&state, request).await
}
