mod comment_store;
