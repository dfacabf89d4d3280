/*!
# AlertMesh DevKit - Stubs et utilitaires de test

- Transport simulé (noeud en mémoire, réponses scriptées, pannes)
- Fabrique de lignes brutes au format du noeud
- Harness assemblant transport + feed
*/

pub mod line_builder;
pub mod test_utils;
pub mod transport_stub;

pub use line_builder::{raw_line, LineBuilder};
pub use test_utils::TestHarness;
pub use transport_stub::{MockTransport, Reply};
