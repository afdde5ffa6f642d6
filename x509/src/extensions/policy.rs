use asn1::{SchemaBuilder, SchemaError, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.4

certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation

PolicyInformation ::= SEQUENCE {
     policyIdentifier   CertPolicyId,
     policyQualifiers   SEQUENCE SIZE (1..MAX) OF
                             PolicyQualifierInfo OPTIONAL }

CertPolicyId ::= OBJECT IDENTIFIER

PolicyQualifierInfo ::= SEQUENCE {
     policyQualifierId  PolicyQualifierId,
     qualifier          ANY DEFINED BY policyQualifierId }
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let information = b.declare("PolicyInformation");
    let policy_id = b.declare("CertPolicyId");
    let qualifiers = b.declare("PolicyQualifiers");
    let qualifier_info = b.declare("PolicyQualifierInfo");
    let qualifier_id = b.declare("PolicyQualifierId");
    let mapping = b.declare("PolicyMapping");
    let skip_certs = b.declare("SkipCerts");

    b.define("CertificatePolicies", Type::sequence_of(Type::reference(information)))?;
    b.define(
        "PolicyInformation",
        Type::sequence([
            field("policyIdentifier", Type::reference(policy_id)),
            field("policyQualifiers", Type::reference(qualifiers)).optional(),
        ]),
    )?;
    b.define("CertPolicyId", Type::object_identifier())?;
    b.define("PolicyQualifiers", Type::sequence_of(Type::reference(qualifier_info)))?;
    b.define(
        "PolicyQualifierInfo",
        Type::sequence([
            field("policyQualifierId", Type::reference(qualifier_id)),
            field("qualifier", Type::any()),
        ]),
    )?;
    b.define("PolicyQualifierId", Type::object_identifier())?;

    /*
    PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
         issuerDomainPolicy      CertPolicyId,
         subjectDomainPolicy     CertPolicyId }
     */
    b.define("PolicyMappings", Type::sequence_of(Type::reference(mapping)))?;
    b.define(
        "PolicyMapping",
        Type::sequence([
            field("issuerDomainPolicy", Type::reference(policy_id)),
            field("subjectDomainPolicy", Type::reference(policy_id)),
        ]),
    )?;

    /*
    PolicyConstraints ::= SEQUENCE {
         requireExplicitPolicy           [0] SkipCerts OPTIONAL,
         inhibitPolicyMapping            [1] SkipCerts OPTIONAL }

    SkipCerts ::= INTEGER (0..MAX)

    InhibitAnyPolicy ::= SkipCerts
     */
    b.define(
        "PolicyConstraints",
        Type::sequence([
            field("requireExplicitPolicy", Type::reference(skip_certs).implicit(0)).optional(),
            field("inhibitPolicyMapping", Type::reference(skip_certs).implicit(1)).optional(),
        ]),
    )?;
    b.define("SkipCerts", Type::integer())?;
    b.define("InhibitAnyPolicy", Type::reference(skip_certs))?;
    Ok(())
}
