//! Generator page rendering

use crate::AppState;

pub async fn page_generate(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let max_transactions = state.config.generator.max_transactions;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>资料产生</h2>
            <p class='text-sm text-gray-500'>产生测试用的客户与交易资料</p></div>
        <div class='grid grid-cols-1 md:grid-cols-2 gap-6'>
            <form hx-post='/generate/customers' hx-target='#generate-result' hx-swap='innerHTML'
                class='bg-white rounded-xl shadow-sm p-6 space-y-4'>
                <h3 class='text-lg font-semibold'>产生客户</h3>
                <div><label class='block text-sm text-gray-600 mb-1'>客户数量</label>
                    <input type='number' name='num' min='1' value='10' required class='w-full px-3 py-2 border rounded-lg'></div>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>产生</button>
            </form>
            <form hx-post='/generate/transactions' hx-target='#generate-result' hx-swap='innerHTML'
                class='bg-white rounded-xl shadow-sm p-6 space-y-4'>
                <h3 class='text-lg font-semibold'>产生交易</h3>
                <div><label class='block text-sm text-gray-600 mb-1'>交易数量（最多 {}）</label>
                    <input type='number' name='transactions_num' min='1' max='{}' value='100' required class='w-full px-3 py-2 border rounded-lg'></div>
                <div><label class='block text-sm text-gray-600 mb-1'>客户数量</label>
                    <input type='number' name='customers_num' min='1' value='10' required class='w-full px-3 py-2 border rounded-lg'></div>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>产生</button>
            </form>
        </div>
        <div id='generate-result' class='mt-6'></div>"#,
        max_transactions,
        max_transactions
    );

    axum::response::Html(crate::page_response(&headers, "资料产生", "/generate", &inner_content))
}
