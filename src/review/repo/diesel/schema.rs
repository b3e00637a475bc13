pub mod bookshelf {
    diesel::table! {
        bookshelf.review (id) {
            id -> Int8,
            book_id -> Int8,
            user_id -> Int8,
            #[max_length = 256]
            title -> Varchar,
            content -> Text,
            rating -> Int4,
            refined_content -> Nullable<Text>,
            registered_at -> Timestamp,
        }
    }
}
