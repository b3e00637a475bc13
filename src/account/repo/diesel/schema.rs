pub mod bookshelf {
    diesel::table! {
        bookshelf.account (id) {
            id -> Int8,
            #[max_length = 64]
            username -> Varchar,
            #[max_length = 256]
            email -> Varchar,
            #[max_length = 128]
            name -> Varchar,
            bio -> Nullable<Text>,
            #[max_length = 512]
            profile_image -> Nullable<Varchar>,
            registered_at -> Timestamp,
        }
    }
}
