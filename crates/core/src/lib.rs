//! Groups photos by the people in them.
//!
//! Face embeddings come from an external model service through the
//! [`embedding::domain::embedding_source::EmbeddingSource`] port. One of two
//! identity resolvers labels every accepted face, and the results are turned
//! into a photo-to-person assignment, an avatar per person and a copy plan.

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod face_observation;
    pub mod person;
    pub mod settings;
}

pub mod clustering {
    pub mod domain {
        pub mod clustering_error;
        pub mod distance;
        pub mod identity_resolver;
        pub mod progress;
    }
    pub mod infrastructure;
}

pub mod avatar {
    pub mod domain {
        pub mod avatar_selector;
        pub mod avatar_writer;
    }
    pub mod infrastructure;
}

pub mod organize {
    pub mod domain {
        pub mod group_organizer;
        pub mod photo_assignment;
    }
    pub mod infrastructure;
}

pub mod embedding {
    pub mod domain {
        pub mod embedding_source;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod extraction_executor;
    pub mod group_photos_use_case;
    pub mod infrastructure;
}
