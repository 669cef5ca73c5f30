//! Transaction screen rendering
//!
//! Endpoints:
//! - page_customer_transactions: Opens a screen for one customer
//!
//! Helper functions:
//! - render_screen_view: The polled view fragment (notices, table, summary)

use std::sync::Arc;

use crate::{ApiResult, AppState, Screen};
use custweb_core::{CoreError, FrameBuffer, Notice, NoticeLevel, TransactionViewSync, ViewFrame};
use custweb_utils::escape_html;

/// Open a transaction screen: register it, start the initial load and
/// return the page. The view fills in once the load renders.
pub async fn page_customer_transactions(
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

    let frames = Arc::new(FrameBuffer::new());
    let sync = Arc::new(TransactionViewSync::starting_today(
        customer.id.clone(),
        state.source.clone(),
        frames.clone(),
        state.config.transactions.default_window_months,
        state.config.request_timeout(),
    ));
    let range = sync.current_range();

    let screen = Screen {
        id: custweb_utils::generate_id(),
        customer,
        sync,
        frames,
    };
    let (screen, evicted) = state.screens.write().await.insert(screen);
    if let Some(evicted) = evicted {
        log::info!(target: "custweb::api", "Screen limit reached, closed screen {}", evicted);
    }
    log::debug!(
        target: "custweb::api",
        "Opened screen {} for customer {}",
        screen.id,
        screen.customer.id
    );
    screen.sync.spawn_initial_load();

    let (from, to) = range.bounds();
    let inner_content = format!(
        r#"<div class='mb-6'><a href='/customers' class='text-sm text-indigo-600'>&larr; 返回客户列表</a>
            <h2 class='text-2xl font-bold mt-2'>{} 的交易记录</h2></div>
        <form hx-post='/screens/{}/filter' hx-target='#screen-view' hx-swap='outerHTML'
            class='bg-white rounded-xl shadow-sm p-4 mb-4 flex items-end gap-3'>
            <div><label class='block text-xs text-gray-500 mb-1'>开始日期</label>
                <input type='date' name='from' value='{}' class='px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-xs text-gray-500 mb-1'>结束日期</label>
                <input type='date' name='to' value='{}' class='px-3 py-2 border rounded-lg'></div>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>筛选</button>
        </form>
        {}
        <script>
        window.addEventListener('pagehide', function() {{
            fetch('/screens/{}', {{method: 'DELETE', keepalive: true}});
        }});
        </script>"#,
        escape_html(&screen.customer.name),
        screen.id,
        from,
        to,
        render_screen_view(&screen.id, None, &[]),
        screen.id
    );

    Ok(axum::response::Html(crate::page_response(&headers, "交易记录", "/customers", &inner_content)))
}

fn notice_level(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

/// The polled view container.
///
/// It re-polls `/screens/:screen/view` with the version it shows; the
/// server answers 204 until something newer exists.
pub fn render_screen_view(screen_id: &str, frame: Option<&ViewFrame>, notices: &[Notice]) -> String {
    let version = frame.map(|f| f.version).unwrap_or(0);
    let notices_html: String = notices
        .iter()
        .map(|notice| crate::notice_html(notice_level(notice.level), &notice.message))
        .collect();

    let body = match frame {
        None => "<p class='text-gray-500 text-center py-6'>加载中...</p>".to_string(),
        Some(frame) => {
            let rows: String = if frame.rows.is_empty() {
                "<tr><td colspan='3' class='px-4 py-6 text-center text-gray-500'>此区间没有交易</td></tr>".to_string()
            } else {
                frame
                    .rows
                    .iter()
                    .map(|row| {
                        let amount_class = if row.amount.starts_with('-') { "text-red-600" } else { "text-green-600" };
                        format!(
                            "<tr class='border-b'><td class='px-4 py-2'>{}</td><td class='px-4 py-2 text-right font-mono {}'>{}</td><td class='px-4 py-2 text-right'>{}</td></tr>",
                            escape_html(&row.time),
                            amount_class,
                            row.amount,
                            escape_html(&row.sequence)
                        )
                    })
                    .collect()
            };
            format!(
                r#"<table class='w-full text-sm'>
                <thead class='bg-gray-50 text-gray-600'><tr>
                    <th class='px-4 py-2 text-left'>时间</th>
                    <th class='px-4 py-2 text-right'>金额</th>
                    <th class='px-4 py-2 text-right'>序号</th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
            <div class='flex gap-6 px-4 py-3 text-sm bg-gray-50'>
                <span>{}</span>
                <span>交易笔数：<strong>{}</strong></span>
                <span>总金额：<strong class='font-mono'>{}</strong></span>
            </div>"#,
                rows,
                frame.range.description(),
                frame.summary.count,
                frame.total_display
            )
        }
    };

    format!(
        r#"<div id='screen-view' hx-get='/screens/{}/view?since={}' hx-trigger='every 1s' hx-swap='outerHTML'
            class='bg-white rounded-xl shadow-sm overflow-hidden' data-version='{}'>
            {}{}
        </div>"#,
        screen_id, version, version, notices_html, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::test_support::{record, state_with, FakeServices};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use custweb_core::FilterRange;
    use tower::ServiceExt;

    #[test]
    fn test_render_frame() {
        let range = FilterRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let frame = ViewFrame::build(
            3,
            range,
            &[record("a", "2024-01-05 10:00", "10.50"), record("b", "2024-01-06 10:00", "-3.25")],
        );
        let html = render_screen_view("s1", Some(&frame), &[Notice::error("无法更新")]);

        assert!(html.contains("/screens/s1/view?since=3"));
        assert!(html.contains("2024-01-05 10:00"));
        assert!(html.contains("-3.25"));
        assert!(html.contains("<strong>2</strong>"));
        assert!(html.contains("7.25"));
        assert!(html.contains("无法更新"));
    }

    #[test]
    fn test_render_loading() {
        let html = render_screen_view("s1", None, &[]);
        assert!(html.contains("since=0"));
        assert!(html.contains("加载中"));
    }

    #[tokio::test]
    async fn test_open_screen_registers_it() {
        let state = state_with(Arc::new(FakeServices::default()));
        let router = create_router(state.clone());

        let response = router
            .oneshot(Request::builder().uri("/customers/c1/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Alice &lt;A&gt; 的交易记录"));
        assert_eq!(state.screens.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_open_screen_unknown_customer() {
        let state = state_with(Arc::new(FakeServices::default()));
        let response = create_router(state.clone())
            .oneshot(Request::builder().uri("/customers/nobody/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.screens.read().await.is_empty());
    }
}
