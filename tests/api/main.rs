mod count_documents;
mod helpers;
