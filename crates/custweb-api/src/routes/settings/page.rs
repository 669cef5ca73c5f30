//! Settings page rendering - Full page endpoints

use crate::AppState;
use custweb_utils::escape_html;

pub async fn page_settings(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;
    let open_screens = state.screens.read().await.len();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>设置</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>服务器设置</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>主机地址</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>端口</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>上游服务</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>客户与交易 API</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>资料产生服务</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>请求超时</p><p class='font-medium'>{} 秒</p></div>
                <div><p class='text-sm text-gray-500'>最大并发请求</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>交易画面</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>预设筛选区间</p><p class='font-medium'>过去 {} 个月</p></div>
                <div><p class='text-sm text-gray-500'>客户列表统计区间</p><p class='font-medium'>过去 {} 个月</p></div>
                <div><p class='text-sm text-gray-500'>开启中的画面</p><p class='font-medium'>{} / {}</p></div>
                <div><p class='text-sm text-gray-500'>单次最多产生交易</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>日志</h3>
            <div><p class='text-sm text-gray-500'>日志级别</p><p class='font-medium'>{}</p></div>
        </div>"#,
        escape_html(&config.server.host),
        config.server.port,
        escape_html(&config.upstream.api_base_url),
        escape_html(&config.upstream.generator_base_url),
        config.upstream.request_timeout_secs,
        config.upstream.max_concurrent_requests,
        config.transactions.default_window_months,
        config.transactions.summary_window_months,
        open_screens,
        config.screens.max_open,
        config.generator.max_transactions,
        escape_html(&config.logging.level)
    );

    axum::response::Html(crate::page_response(&headers, "设置", "/settings", &inner_content))
}
