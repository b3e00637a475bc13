pub mod bookshelf {
    diesel::table! {
        bookshelf.shelf_entry (user_id, book_id) {
            user_id -> Int8,
            book_id -> Int8,
            #[max_length = 16]
            status -> Varchar,
            added_at -> Timestamp,
        }
    }
}
