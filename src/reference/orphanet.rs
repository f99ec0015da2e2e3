//! Orphanet rare-disease ontology

use super::{ReferenceError, ReferenceResult};
use sophia::api::prelude::*;
use std::collections::HashMap;
use std::convert::Infallible;
use std::io::{BufRead, BufReader};
use std::path::Path;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const EFO_DEFINITION: &str = "http://www.ebi.ac.uk/efo/definition";
const HAS_DB_XREF: &str = "http://www.geneontology.org/formats/oboInOwl#hasDbXref";

/// Namespace of Orphanet rare-disease classes
pub const ORDO_NAMESPACE: &str = "http://www.orpha.net/ORDO/";

/// A labelled ontology class
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanetClass {
    pub uri: String,
    pub label: String,
    pub definition: Option<String>,
    /// Cross-reference literals in document order
    pub xrefs: Vec<String>,
}

#[derive(Default)]
struct ClassBuilder {
    is_class: bool,
    label: Option<String>,
    definition: Option<String>,
    xrefs: Vec<String>,
}

/// Orphanet classes keyed by URI, restricted to the ORDO namespace
#[derive(Debug, Default)]
pub struct OrphanetOntology {
    classes: HashMap<String, OrphanetClass>,
}

impl OrphanetOntology {
    pub fn from_path(path: impl AsRef<Path>) -> ReferenceResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse an RDF/XML document. Only ORDO subjects typed `owl:Class` that
    /// carry an `rdfs:label` are kept.
    pub fn from_reader<R: BufRead>(reader: R) -> ReferenceResult<Self> {
        let mut subjects: HashMap<String, ClassBuilder> = HashMap::new();

        let mut parser = sophia::xml::parser::parse_bufread(reader);
        parser
            .try_for_each_triple(|t| -> Result<(), Infallible> {
                let subject = match t.s().iri() {
                    Some(iri) => iri.as_str().to_string(),
                    None => return Ok(()),
                };
                let predicate = match t.p().iri() {
                    Some(iri) => iri.as_str().to_string(),
                    None => return Ok(()),
                };
                let entry = subjects.entry(subject).or_default();
                match predicate.as_str() {
                    RDF_TYPE => {
                        if let Some(iri) = t.o().iri() {
                            if iri.as_str() == OWL_CLASS {
                                entry.is_class = true;
                            }
                        }
                    }
                    RDFS_LABEL => {
                        if entry.label.is_none() {
                            entry.label = t.o().lexical_form().map(|s| s.to_string());
                        }
                    }
                    EFO_DEFINITION => {
                        if entry.definition.is_none() {
                            entry.definition = t.o().lexical_form().map(|s| s.to_string());
                        }
                    }
                    HAS_DB_XREF => {
                        if let Some(xref) = t.o().lexical_form() {
                            entry.xrefs.push(xref.to_string());
                        }
                    }
                    _ => {}
                }
                Ok(())
            })
            .map_err(|e| ReferenceError::Rdf(e.to_string()))?;

        let classes = subjects
            .into_iter()
            .filter(|(uri, b)| b.is_class && uri.starts_with(ORDO_NAMESPACE))
            .filter_map(|(uri, b)| {
                let label = b.label?;
                Some((
                    uri.clone(),
                    OrphanetClass {
                        uri,
                        label,
                        definition: b.definition,
                        xrefs: b.xrefs,
                    },
                ))
            })
            .collect();

        Ok(Self { classes })
    }

    /// Class whose URI is exactly `<ORDO>Orphanet_<numeric_id>`
    pub fn get(&self, numeric_id: &str) -> Option<&OrphanetClass> {
        self.classes
            .get(&format!("{}Orphanet_{}", ORDO_NAMESPACE, numeric_id))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<OrphanetClass> for OrphanetOntology {
    fn from_iter<I: IntoIterator<Item = OrphanetClass>>(iter: I) -> Self {
        let classes = iter
            .into_iter()
            .map(|c| (c.uri.clone(), c))
            .collect();
        Self { classes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWL: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:efo="http://www.ebi.ac.uk/efo/"
         xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
  <owl:Class rdf:about="http://www.orpha.net/ORDO/Orphanet_93460">
    <rdfs:label xml:lang="en">Guttate psoriasis</rdfs:label>
    <efo:definition xml:lang="en">A form of psoriasis.</efo:definition>
    <oboInOwl:hasDbXref>ICD-10:L40.4</oboInOwl:hasDbXref>
    <oboInOwl:hasDbXref>UMLS:C0263361</oboInOwl:hasDbXref>
  </owl:Class>
  <owl:Class rdf:about="http://www.orpha.net/ORDO/Orphanet_934600">
    <rdfs:label xml:lang="en">Longer id</rdfs:label>
  </owl:Class>
  <owl:Class rdf:about="http://www.orpha.net/ORDO/Orphanet_558">
    <rdfs:label xml:lang="en">Marfan syndrome</rdfs:label>
  </owl:Class>
  <owl:Class rdf:about="http://www.orpha.net/ORDO/Orphanet_999">
  </owl:Class>
  <owl:Class rdf:about="http://example.org/mirror/Orphanet_558">
    <rdfs:label xml:lang="en">Foreign namespace copy</rdfs:label>
  </owl:Class>
  <rdf:Description rdf:about="http://www.orpha.net/ORDO/Orphanet_777">
    <rdfs:label>Not a class</rdfs:label>
  </rdf:Description>
</rdf:RDF>
"#;

    fn ontology() -> OrphanetOntology {
        OrphanetOntology::from_reader(OWL.as_bytes()).unwrap()
    }

    #[test]
    fn parses_labelled_classes() {
        let onto = ontology();
        let class = onto.get("93460").unwrap();
        assert_eq!(class.uri, "http://www.orpha.net/ORDO/Orphanet_93460");
        assert_eq!(class.label, "Guttate psoriasis");
        assert_eq!(class.definition.as_deref(), Some("A form of psoriasis."));
        assert_eq!(class.xrefs, vec!["ICD-10:L40.4", "UMLS:C0263361"]);
    }

    #[test]
    fn lookup_is_exact_not_prefix() {
        let onto = ontology();
        assert_eq!(onto.get("93460").unwrap().label, "Guttate psoriasis");
        assert_eq!(onto.get("934600").unwrap().label, "Longer id");
        assert!(onto.get("9346").is_none());
    }

    #[test]
    fn unlabelled_and_untyped_subjects_are_dropped() {
        let onto = ontology();
        assert!(onto.get("999").is_none());
        assert!(onto.get("777").is_none());
        assert!(onto.get("558").unwrap().definition.is_none());
        assert_eq!(onto.len(), 3);
    }

    #[test]
    fn same_local_name_outside_ordo_is_ignored() {
        for _ in 0..8 {
            let onto = ontology();
            let class = onto.get("558").unwrap();
            assert_eq!(class.uri, "http://www.orpha.net/ORDO/Orphanet_558");
            assert_eq!(class.label, "Marfan syndrome");
        }
    }

    #[test]
    fn malformed_document_is_an_error() {
        let result = OrphanetOntology::from_reader("<rdf:RDF><broken".as_bytes());
        assert!(matches!(result, Err(ReferenceError::Rdf(_))));
    }
}
