//! Exact nearest-neighbour index over squared L2 distance.

use serde::Serialize;

use crate::retrieval::chunker::Chunk;
use crate::retrieval::RetrievalError;

/// A search hit: position in the index plus its squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}

/// Brute-force index. Every stored vector has exactly `dimension` components.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Appends a vector and returns its id.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize, RetrievalError> {
        self.check_dimension(&vector)?;
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// Returns up to `k` neighbours ordered by ascending distance; ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError> {
        self.check_dimension(query)?;

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Neighbor {
                id,
                distance: squared_l2(v, query),
            })
            .collect();

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), RetrievalError> {
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Chunk texts paired with their vectors. Index ids are chunk positions.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    index: FlatL2Index,
    chunks: Vec<Chunk>,
}

/// A retrieved chunk with its distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            index: FlatL2Index::new(dimension),
            chunks: Vec::new(),
        }
    }

    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<(), RetrievalError> {
        self.index.add(vector)?;
        self.chunks.push(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Stored chunks in document order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
        Ok(self
            .index
            .search(query, k)?
            .into_iter()
            .map(|n| ScoredChunk {
                chunk: self.chunks[n.id].clone(),
                distance: n.distance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_vector_is_always_returned() {
        let mut index = FlatL2Index::new(3);
        index.add(vec![1.0, 0.0, 0.0]).unwrap();

        for query in [[0.0, 0.0, 0.0], [-5.0, 2.0, 9.0], [1.0, 0.0, 0.0]] {
            let hits = index.search(&query, 2).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].id, 0);
        }
    }

    #[test]
    fn test_neighbors_are_sorted_by_distance() {
        let mut index = FlatL2Index::new(2);
        index.add(vec![10.0, 10.0]).unwrap();
        index.add(vec![1.0, 1.0]).unwrap();
        index.add(vec![3.0, 3.0]).unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!((hits[0].distance - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_k_is_capped_at_index_size() {
        let mut index = FlatL2Index::new(1);
        index.add(vec![0.0]).unwrap();
        index.add(vec![1.0]).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0], 1).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = FlatL2Index::new(4);
        assert!(index.is_empty());
        assert!(index.search(&[0.0; 4], 2).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut index = FlatL2Index::new(3);
        let err = index.add(vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(index.search(&[1.0; 4], 1).is_err());
    }

    #[test]
    fn test_vector_index_maps_hits_back_to_chunk_text() {
        let mut index = VectorIndex::new(2);
        index
            .insert(Chunk { id: 0, text: "education".into() }, vec![5.0, 5.0])
            .unwrap();
        index
            .insert(Chunk { id: 1, text: "experience".into() }, vec![0.0, 1.0])
            .unwrap();

        let hits = index.retrieve(&[0.0, 0.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.text, "experience");
    }
}
