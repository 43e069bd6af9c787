use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Provide 'address'/'cep' or both 'lat' and 'lon'"))]
    MissingInput,

    #[snafu(display("Invalid 'lat' and 'lon' parameters: {}", details))]
    InvalidCoordinates { details: String },

    #[snafu(display("Could not geocode '{}'", query))]
    NotFound { query: String },

    #[snafu(display("Church Retrieval Error: {}", source))]
    ChurchRetrieval {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
