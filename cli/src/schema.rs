// Tables touched by the importer; kept in sync with the server schema.

diesel::table! {
    ingredients (id) {
        id -> Uuid,
        #[max_length = 128]
        name -> Varchar,
        #[max_length = 64]
        measurement_unit -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Uuid,
        #[max_length = 32]
        name -> Varchar,
        #[max_length = 32]
        slug -> Varchar,
        created_at -> Timestamptz,
    }
}
