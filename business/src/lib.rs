pub mod application {
    pub mod product {
        pub mod create;
        pub mod delete;
        pub mod export_csv;
        pub mod get_by_id;
        pub mod import_csv;
        pub mod list;
        #[cfg(test)]
        pub(crate) mod mocks;
        pub mod update;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod product {
        pub mod errors;
        pub mod filter;
        pub mod import;
        pub mod model;
        pub mod predicate;
        pub mod repository;
        pub mod use_cases {
            pub mod create;
            pub mod delete;
            pub mod export_csv;
            pub mod get_by_id;
            pub mod import_csv;
            pub mod list;
            pub mod update;
        }
    }
}
