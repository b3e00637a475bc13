pub mod bookshelf {
    diesel::table! {
        bookshelf.book (id) {
            id -> Int8,
            #[max_length = 256]
            title -> Varchar,
            #[max_length = 256]
            author -> Varchar,
            description -> Text,
            #[max_length = 512]
            cover_image -> Nullable<Varchar>,
            price -> Float8,
            genres -> Array<Text>,
            featured -> Bool,
            published_date -> Nullable<Date>,
            #[max_length = 256]
            publisher -> Nullable<Varchar>,
            pages -> Nullable<Int4>,
            #[max_length = 32]
            language -> Nullable<Varchar>,
            #[max_length = 17]
            isbn -> Nullable<Varchar>,
            registered_at -> Timestamp,
        }
    }
}
