//! Datasets bundled with the crate.
use crate::data_handling::RawDataset;
use crate::error::Result;
use crate::io::parse_arff;

/// Fisher's iris data: 150 records, four numeric measurements and a
/// three-label class attribute.
pub const IRIS_ARFF: &str = include_str!("../data/iris.arff");

/// File name reported for the bundled iris data.
pub const IRIS_SOURCE: &str = "iris.arff";

pub fn iris() -> Result<RawDataset> {
    parse_arff(IRIS_ARFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iris_has_expected_shape() {
        let ds = iris().unwrap();
        assert_eq!(ds.relation(), "iris");
        assert_eq!(ds.num_rows(), 150);
        assert_eq!(ds.num_attributes(), 5);
        assert_eq!(
            ds.attributes()[4].labels().unwrap(),
            &["Iris-setosa", "Iris-versicolor", "Iris-virginica"]
        );
    }
}
