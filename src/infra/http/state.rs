use std::sync::Arc;

use crate::application::api_keys::ApiKeyService;
use crate::application::authors::AuthorService;
use crate::application::books::BookService;
use crate::application::repos::StoreHealth;

#[derive(Clone)]
pub struct ApiState {
    pub authors: Arc<AuthorService>,
    pub books: Arc<BookService>,
    pub api_keys: Arc<ApiKeyService>,
    pub health: Arc<dyn StoreHealth>,
}
