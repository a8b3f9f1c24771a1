pub mod products;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    let v1 = Router::new().merge(products::routes());

    Router::new().nest("/v1", v1)
}
