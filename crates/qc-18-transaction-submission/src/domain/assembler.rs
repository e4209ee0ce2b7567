//! # Transaction Assembler
//!
//! Turns a quorum-accepted [`TransactionRequest`] into the encoded commit
//! payload that gets signed into an envelope.

use super::codec;
use super::entities::{
    ChaincodeActionPayload, ChaincodeEndorsedAction, ChaincodeProposalPayload, Endorsement,
    Payload, Transaction, TransactionAction, TransactionRequest,
};
use super::errors::{Result, SubmissionError};

/// Check the request the way the quorum validator would have.
fn ensure_assemblable(request: &TransactionRequest) -> Result<()> {
    if request.responses().is_empty() {
        return Err(SubmissionError::InvalidTransactionRequest(
            "no endorsement responses",
        ));
    }
    if request.responses().iter().any(|r| !r.is_success()) {
        return Err(SubmissionError::InvalidTransactionRequest(
            "request contains a failed endorsement",
        ));
    }
    if request.proposal().is_empty() {
        return Err(SubmissionError::InvalidTransactionRequest("empty proposal"));
    }
    Ok(())
}

/// Assemble the encoded commit payload.
///
/// Endorsements keep arrival order and are not deduplicated. The transient map
/// is dropped from the proposal payload so private data never reaches the
/// ordering service.
pub fn assemble(request: &TransactionRequest) -> Result<Vec<u8>> {
    ensure_assemblable(request)?;

    let endorsements: Vec<Endorsement> = request
        .responses()
        .iter()
        .map(|r| r.endorsement.clone())
        .collect();

    // Every endorser signed the same result; the first one carries it.
    let proposal_response_payload = request.responses()[0].payload.clone();

    let proposal_payload = request.proposal().chaincode_payload()?;
    let chaincode_proposal_payload = codec::encode(
        "chaincode proposal payload",
        &ChaincodeProposalPayload {
            input: proposal_payload.input,
            transient_map: None,
        },
    )?;

    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload,
        action: ChaincodeEndorsedAction {
            proposal_response_payload,
            endorsements,
        },
    };

    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: request.header().signature_header_bytes().to_vec(),
            payload: codec::encode("chaincode action payload", &action_payload)?,
        }],
    };

    let payload = Payload {
        header: request.header().clone(),
        data: codec::encode("transaction", &transaction)?,
    };

    codec::encode("payload", &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::{build_channel_header, build_header, build_proposal};
    use crate::domain::entities::{
        ChaincodeInvocationSpec, EndorsementResponse, HeaderType, Proposal, Response, Timestamp,
        TransientMap,
    };

    fn response(peer: &[u8], status: i32) -> EndorsementResponse {
        EndorsementResponse {
            version: 1,
            response: Response {
                status,
                message: "OK".into(),
                payload: vec![],
            },
            payload: b"simulation-result".to_vec(),
            endorsement: Endorsement {
                endorser: peer.to_vec(),
                signature: [peer, &b"-sig"[..]].concat(),
            },
        }
    }

    fn request_with(responses: Vec<EndorsementResponse>) -> TransactionRequest {
        let channel_header = build_channel_header(
            HeaderType::EndorserTransaction,
            "tx-42",
            "businesschannel",
            Timestamp::default(),
            0,
            None,
        );
        let header = build_header(b"client", &channel_header, b"nonce").unwrap();
        let mut transient = TransientMap::new();
        transient.insert("price".into(), b"100".to_vec());
        let proposal = build_proposal(
            &ChaincodeInvocationSpec::invoke("mycc", "sell", &[b"asset1"]),
            &header,
            Some(&transient),
        )
        .unwrap();
        TransactionRequest::new(responses, proposal, header)
    }

    fn decode_action(bytes: &[u8]) -> (Payload, ChaincodeActionPayload) {
        let payload: Payload = codec::decode("payload", bytes).unwrap();
        let tx: Transaction = codec::decode("transaction", &payload.data).unwrap();
        assert_eq!(tx.actions.len(), 1);
        let action: ChaincodeActionPayload =
            codec::decode("chaincode action payload", &tx.actions[0].payload).unwrap();
        (payload, action)
    }

    #[test]
    fn test_endorsements_keep_arrival_order() {
        let request = request_with(vec![
            response(b"peer2", 200),
            response(b"peer0", 200),
            response(b"peer1", 200),
        ]);

        let (_, action) = decode_action(&assemble(&request).unwrap());

        let endorsers: Vec<_> = action
            .action
            .endorsements
            .iter()
            .map(|e| e.endorser.clone())
            .collect();
        assert_eq!(
            endorsers,
            vec![b"peer2".to_vec(), b"peer0".to_vec(), b"peer1".to_vec()]
        );
        assert_eq!(
            action.action.proposal_response_payload,
            b"simulation-result".to_vec()
        );
    }

    #[test]
    fn test_header_and_signature_header_carried() {
        let request = request_with(vec![response(b"peer0", 200)]);

        let bytes = assemble(&request).unwrap();
        let payload: Payload = codec::decode("payload", &bytes).unwrap();
        let tx: Transaction = codec::decode("transaction", &payload.data).unwrap();

        assert_eq!(&payload.header, request.header());
        assert_eq!(
            tx.actions[0].header,
            request.header().signature_header_bytes()
        );
    }

    #[test]
    fn test_transient_map_stripped() {
        let request = request_with(vec![response(b"peer0", 200)]);

        let (_, action) = decode_action(&assemble(&request).unwrap());
        let proposal_payload: ChaincodeProposalPayload = codec::decode(
            "chaincode proposal payload",
            &action.chaincode_proposal_payload,
        )
        .unwrap();

        assert!(proposal_payload.transient_map.is_none());
        assert_eq!(
            proposal_payload.input,
            request.proposal().chaincode_payload().unwrap().input
        );
    }

    #[test]
    fn test_duplicate_endorsers_not_deduplicated() {
        let request = request_with(vec![response(b"peer0", 200), response(b"peer0", 200)]);

        let (_, action) = decode_action(&assemble(&request).unwrap());

        assert_eq!(action.action.endorsements.len(), 2);
    }

    #[test]
    fn test_rejects_empty_responses() {
        let result = assemble(&request_with(vec![]));
        assert!(matches!(
            result,
            Err(SubmissionError::InvalidTransactionRequest(_))
        ));
    }

    #[test]
    fn test_rejects_failed_endorsement() {
        let result = assemble(&request_with(vec![
            response(b"peer0", 200),
            response(b"peer1", 500),
        ]));
        assert!(matches!(
            result,
            Err(SubmissionError::InvalidTransactionRequest(_))
        ));
    }

    #[test]
    fn test_rejects_empty_proposal() {
        let (responses, _, header) = request_with(vec![response(b"peer0", 200)]).into_parts();
        let request = TransactionRequest::new(responses, Proposal::default(), header);

        assert!(matches!(
            assemble(&request),
            Err(SubmissionError::InvalidTransactionRequest("empty proposal"))
        ));
    }
}
