//! Diesel schema for lead and application persistence.

diesel::table! {
    /// Lead records.
    leads (id) {
        /// Internal lead identifier.
        id -> Uuid,
        /// Unique business key.
        #[max_length = 64]
        app_no -> Varchar,
        /// Borrower name.
        name -> Nullable<Text>,
        /// Unique ten-digit mobile number.
        #[max_length = 10]
        mobile_no -> Varchar,
        /// Requested amount in rupees.
        amount -> Nullable<Int8>,
        /// Working status.
        #[max_length = 50]
        status -> Nullable<Varchar>,
        /// Final status derived from `status`.
        #[max_length = 10]
        final_status -> Varchar,
        /// Assigned agent.
        agent_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Upload timestamp.
        uploaded_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only notes on leads.
    lead_notes (id) {
        /// Internal note identifier.
        id -> Uuid,
        /// Owning lead.
        lead_id -> Uuid,
        /// Authoring user.
        author_id -> Uuid,
        /// Note body.
        note -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loan applications spawned from leads.
    applications (id) {
        /// Internal application identifier.
        id -> Uuid,
        /// Owning lead.
        lead_id -> Uuid,
        /// Agent copied from the lead at spawn time.
        agent_id -> Nullable<Uuid>,
        /// Pipeline stage.
        #[max_length = 20]
        stage -> Varchar,
        /// Loan amount in rupees.
        loan_amount -> Int8,
        /// Annual interest rate in basis points.
        interest_rate_bp -> Nullable<Int4>,
        /// Tenure in months.
        tenure_months -> Nullable<Int4>,
        /// Monthly instalment in rupees.
        monthly_emi -> Nullable<Int8>,
        /// Amount released on disbursement.
        disbursed_amount -> Nullable<Int8>,
        /// Time of disbursement.
        disbursed_date -> Nullable<Timestamptz>,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(applications -> leads (lead_id));
diesel::joinable!(lead_notes -> leads (lead_id));
diesel::allow_tables_to_appear_in_same_query!(applications, lead_notes, leads);
